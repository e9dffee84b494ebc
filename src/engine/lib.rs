pub mod aggregator;
pub mod pipeline;
pub mod worker;

pub use aggregator::{AggregatorHandle, CompletionGuard, Publication, ResultAggregator};
pub use pipeline::{Pipeline, run_file};
pub use worker::{Worker, WorkerStats};
