// Models and configuration
pub use crate::common::model::{ComputedRecord, LogConfig, LookupConfig, PipelineConfig, Record};
pub use crate::common::storage::{read_records, render_report, write_report};

// Pipeline
pub use crate::engine::{Pipeline, WorkerStats, run_file};
pub use crate::lookup::{HttpSunsetLookup, SunsetLookup};
pub use crate::queue::RecordQueue;

// Errors
pub use crate::errors::{Error, ErrorKind, Result};

// Utils
pub use crate::utils::logger::LoggerConfig;
