pub mod error;

pub use error::{
    BoxError, ConfigError, Error, ErrorKind, InputError, LookupError, OutputError, PipelineError,
    QueueError, Result,
};
