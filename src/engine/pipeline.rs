use crate::common::model::{ComputedRecord, PipelineConfig, Record};
use crate::common::storage::{read_records, write_report};
use crate::engine::aggregator::ResultAggregator;
use crate::engine::worker::{Worker, WorkerStats};
use crate::errors::{PipelineError, Result};
use crate::lookup::{HttpSunsetLookup, SunsetLookup};
use crate::queue::RecordQueue;
use log::{error, info};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::Instrument;

/// Wires the record queue, the worker pool and the result aggregator.
pub struct Pipeline {
    worker_count: usize,
    lookup: Arc<dyn SunsetLookup>,
}

impl Pipeline {
    pub fn new(worker_count: usize, lookup: Arc<dyn SunsetLookup>) -> Result<Self> {
        if worker_count == 0 {
            return Err(PipelineError::InvalidWorkerCount(worker_count).into());
        }
        Ok(Self {
            worker_count,
            lookup,
        })
    }

    /// Builds a pipeline that resolves sunsets over HTTP as configured.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let lookup = HttpSunsetLookup::new(&config.lookup)?;
        Self::new(config.worker_count, Arc::new(lookup))
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Runs every record through the worker pool and returns the matches in
    /// ascending hour order, ties in arrival order.
    pub async fn run(&self, records: Vec<Record>) -> Result<Vec<ComputedRecord>> {
        let queue = Arc::new(RecordQueue::new());
        let (aggregator, publication) = ResultAggregator::spawn(0..self.worker_count)?;

        info!("Starting {} worker(s)", self.worker_count);
        let mut workers = JoinSet::new();
        for id in 0..self.worker_count {
            let worker = Worker::new(id, queue.clone(), self.lookup.clone(), aggregator.clone());
            workers.spawn(worker.run().instrument(tracing::info_span!("worker", worker_id = id)));
        }
        drop(aggregator);

        info!("Dispatching {} record(s)", records.len());
        let dispatched = records
            .into_iter()
            .try_for_each(|record| queue.enqueue(record));
        queue.close_input();
        dispatched?;

        let matches = publication.wait().await?;

        let mut totals = WorkerStats::default();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(stats) => totals += stats,
                Err(e) => error!("Worker task failed: {e}"),
            }
        }
        info!(
            "Pipeline finished: {} processed, {} matched, {} lookup failure(s)",
            totals.processed, totals.matched, totals.failed
        );

        Ok(matches)
    }
}

/// Reads `input`, runs the pipeline and writes the report to the configured
/// output path. Returns the number of matches written.
pub async fn run_file(
    input: impl AsRef<Path>,
    config: &PipelineConfig,
    pipeline: &Pipeline,
) -> Result<usize> {
    let records = read_records(input).await?;
    let matches = pipeline.run(records).await?;
    write_report(&config.output_path, &matches).await?;
    info!(
        "Wrote {} match(es) to {}",
        matches.len(),
        config.output_path.display()
    );
    Ok(matches.len())
}
