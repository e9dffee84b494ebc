pub mod config;
pub mod record;

pub use config::{LogConfig, LookupConfig, PipelineConfig};
pub use record::{ComputedRecord, Record};
