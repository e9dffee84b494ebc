pub mod http_lookup;

use crate::common::model::Record;
use crate::errors::Result;

pub use http_lookup::{HttpSunsetLookup, parse_sunset_hour};

/// Resolves the local sunset hour (0-23) for a record's date and location.
///
/// Any `Err` is a lookup failure: the caller drops the record and moves on.
#[async_trait::async_trait]
pub trait SunsetLookup: Send + Sync + 'static {
    /// Lookup name, used in logs
    fn name(&self) -> &str;

    async fn sunset_hour(&self, record: &Record) -> Result<u32>;
}
