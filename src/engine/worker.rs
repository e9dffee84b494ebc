use crate::engine::aggregator::AggregatorHandle;
use crate::lookup::SunsetLookup;
use crate::queue::RecordQueue;
use log::{debug, error, info, warn};
use metrics::counter;
use std::ops::AddAssign;
use std::sync::Arc;

/// Per-worker tally, summed by the pipeline for its closing log line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub processed: usize,
    pub matched: usize,
    pub failed: usize,
}

impl AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.processed += other.processed;
        self.matched += other.matched;
        self.failed += other.failed;
    }
}

pub struct Worker {
    id: usize,
    queue: Arc<RecordQueue>,
    lookup: Arc<dyn SunsetLookup>,
    aggregator: AggregatorHandle,
}

impl Worker {
    pub fn new(
        id: usize,
        queue: Arc<RecordQueue>,
        lookup: Arc<dyn SunsetLookup>,
        aggregator: AggregatorHandle,
    ) -> Self {
        Self {
            id,
            queue,
            lookup,
            aggregator,
        }
    }

    /// Drains the queue one record at a time until it reports end-of-stream.
    ///
    /// Lookup failures drop the record and never stop the loop. Completion is
    /// signalled to the aggregator when this future finishes or unwinds.
    pub async fn run(self) -> WorkerStats {
        let _done = self.aggregator.completion_guard(self.id);
        let mut stats = WorkerStats::default();

        while let Some(record) = self.queue.request_next().await {
            stats.processed += 1;
            counter!("sunset_lookups_total").increment(1);

            let sunset_hour = match self.lookup.sunset_hour(&record).await {
                Ok(hour) => hour,
                Err(e) => {
                    stats.failed += 1;
                    counter!("sunset_lookup_failures_total").increment(1);
                    warn!(
                        "Worker {}: {} lookup failed for {}: {}",
                        self.id,
                        self.lookup.name(),
                        record,
                        e
                    );
                    continue;
                }
            };

            let Some(computed) = record.resolve(sunset_hour) else {
                continue;
            };
            debug!("Worker {}: match {}", self.id, computed);
            if let Err(e) = self.aggregator.submit(computed) {
                error!("Worker {}: dropping match: {}", self.id, e);
                continue;
            }
            stats.matched += 1;
            counter!("sunset_matches_total").increment(1);
        }

        info!(
            "Worker {} finished: {} processed, {} matched, {} failed",
            self.id, stats.processed, stats.matched, stats.failed
        );
        stats
    }
}
