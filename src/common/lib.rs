//! Shared domain models, configuration and file I/O for the pipeline.

pub mod model;
pub mod storage;
