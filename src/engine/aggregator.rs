use crate::common::model::ComputedRecord;
use crate::errors::{PipelineError, Result};
use log::{debug, error, info, warn};
use metrics::counter;
use std::collections::HashSet;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::oneshot;

enum AggregatorMessage {
    Submit(ComputedRecord),
    WorkerDone(usize),
}

/// Ingestion surface of the aggregator, cloned into every worker.
///
/// Both operations are non-blocking sends into the aggregator's mailbox, so
/// all workers may call them concurrently. Messages from one handle arrive in
/// the order they were sent.
#[derive(Clone)]
pub struct AggregatorHandle {
    sender: UnboundedSender<AggregatorMessage>,
}

impl AggregatorHandle {
    pub fn submit(&self, record: ComputedRecord) -> Result<()> {
        self.sender
            .send(AggregatorMessage::Submit(record))
            .map_err(|_| PipelineError::AggregatorClosed.into())
    }

    pub fn worker_done(&self, worker_id: usize) -> Result<()> {
        self.sender
            .send(AggregatorMessage::WorkerDone(worker_id))
            .map_err(|_| PipelineError::AggregatorClosed.into())
    }

    /// Returns a guard that reports `worker_id` as done when dropped, so the
    /// signal is sent exactly once even if the worker unwinds.
    pub fn completion_guard(&self, worker_id: usize) -> CompletionGuard {
        CompletionGuard {
            handle: self.clone(),
            worker_id,
        }
    }
}

pub struct CompletionGuard {
    handle: AggregatorHandle,
    worker_id: usize,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.handle.worker_done(self.worker_id) {
            warn!("Worker {} could not report completion: {}", self.worker_id, e);
        }
    }
}

/// The final, hour-ordered collection, delivered once to a single consumer.
pub struct Publication {
    receiver: oneshot::Receiver<Result<Vec<ComputedRecord>>>,
}

impl Publication {
    pub async fn wait(self) -> Result<Vec<ComputedRecord>> {
        self.receiver
            .await
            .map_err(|_| PipelineError::AggregatorClosed)?
    }
}

/// Collects matches from all workers and publishes them once every worker
/// has reported completion.
///
/// Matches are kept in ascending hour order; equal hours keep arrival order.
pub struct ResultAggregator {
    results: Vec<ComputedRecord>,
    live: HashSet<usize>,
    receiver: UnboundedReceiver<AggregatorMessage>,
}

impl ResultAggregator {
    /// Starts the aggregator task for the given worker ids.
    pub fn spawn(worker_ids: impl IntoIterator<Item = usize>) -> Result<(AggregatorHandle, Publication)> {
        let live: HashSet<usize> = worker_ids.into_iter().collect();
        if live.is_empty() {
            return Err(PipelineError::InvalidWorkerCount(0).into());
        }

        let (sender, receiver) = unbounded_channel();
        let (publish, publication) = oneshot::channel();
        let aggregator = ResultAggregator {
            results: Vec::new(),
            live,
            receiver,
        };
        tokio::spawn(aggregator.run(publish));

        Ok((AggregatorHandle { sender }, Publication { receiver: publication }))
    }

    async fn run(mut self, publish: oneshot::Sender<Result<Vec<ComputedRecord>>>) {
        info!("Result aggregator waiting on {} worker(s)", self.live.len());

        let outcome = loop {
            match self.receiver.recv().await {
                Some(AggregatorMessage::Submit(record)) => self.insert(record),
                Some(AggregatorMessage::WorkerDone(worker_id)) => {
                    if !self.live.remove(&worker_id) {
                        counter!("sunset_aggregator_rejected_signals_total").increment(1);
                        error!("Ignoring completion signal from worker {worker_id}: not live");
                        continue;
                    }
                    debug!(
                        "Worker {} done, {} still live",
                        worker_id,
                        self.live.len()
                    );
                    if self.live.is_empty() {
                        break Ok(std::mem::take(&mut self.results));
                    }
                }
                None => {
                    error!(
                        "All aggregator handles dropped with {} worker(s) still live",
                        self.live.len()
                    );
                    break Err(PipelineError::AggregatorStalled(self.live.len()).into());
                }
            }
        };

        if let Ok(results) = &outcome {
            info!("Publishing {} match(es)", results.len());
        }
        if publish.send(outcome).is_err() {
            warn!("Final results dropped: nobody is waiting for them");
        }
    }

    fn insert(&mut self, record: ComputedRecord) {
        let at = self
            .results
            .partition_point(|existing| existing.hour() <= record.hour());
        self.results.insert(at, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::model::Record;
    use std::time::Duration;
    use tokio::time::timeout;

    fn matched(date: &str, hour: u32) -> ComputedRecord {
        Record::new(date, 0.0, 0.0, hour).resolve(hour).unwrap()
    }

    fn dates(records: &[ComputedRecord]) -> Vec<&str> {
        records.iter().map(|r| r.date()).collect()
    }

    #[tokio::test]
    async fn empty_worker_set_is_rejected() {
        let err = ResultAggregator::spawn(Vec::new()).err().unwrap();
        assert!(matches!(
            err.source_as::<PipelineError>(),
            Some(PipelineError::InvalidWorkerCount(0))
        ));
    }

    #[tokio::test]
    async fn orders_by_hour_and_keeps_arrival_order_on_ties() {
        let (handle, publication) = ResultAggregator::spawn([0]).unwrap();
        handle.submit(matched("a", 5)).unwrap();
        handle.submit(matched("b", 3)).unwrap();
        handle.submit(matched("c", 5)).unwrap();
        handle.submit(matched("d", 0)).unwrap();
        handle.submit(matched("e", 3)).unwrap();
        handle.worker_done(0).unwrap();

        let results = publication.wait().await.unwrap();
        assert_eq!(dates(&results), ["d", "b", "e", "a", "c"]);
    }

    #[tokio::test]
    async fn publishes_only_after_every_worker_is_done() {
        let (handle, publication) = ResultAggregator::spawn(0..3).unwrap();
        let mut publication = Box::pin(publication.wait());

        handle.submit(matched("a", 1)).unwrap();
        handle.worker_done(0).unwrap();
        handle.worker_done(1).unwrap();
        assert!(
            timeout(Duration::from_millis(50), &mut publication).await.is_err(),
            "published before the last worker finished"
        );

        handle.submit(matched("b", 0)).unwrap();
        handle.worker_done(2).unwrap();
        let results = publication.await.unwrap();
        assert_eq!(dates(&results), ["b", "a"]);
    }

    #[tokio::test]
    async fn duplicate_and_unknown_completions_do_not_publish_early() {
        let (handle, publication) = ResultAggregator::spawn([0, 1]).unwrap();
        let mut publication = Box::pin(publication.wait());

        handle.worker_done(0).unwrap();
        handle.worker_done(0).unwrap();
        handle.worker_done(7).unwrap();
        assert!(timeout(Duration::from_millis(50), &mut publication).await.is_err());

        handle.submit(matched("late", 4)).unwrap();
        handle.worker_done(1).unwrap();
        let results = publication.await.unwrap();
        assert_eq!(dates(&results), ["late"]);
    }

    #[tokio::test]
    async fn dropped_handles_fail_instead_of_hanging() {
        let (handle, publication) = ResultAggregator::spawn(0..2).unwrap();
        handle.worker_done(0).unwrap();
        drop(handle);

        let err = timeout(Duration::from_secs(1), publication.wait())
            .await
            .expect("aggregator hung")
            .unwrap_err();
        assert!(matches!(
            err.source_as::<PipelineError>(),
            Some(PipelineError::AggregatorStalled(1))
        ));
    }

    #[tokio::test]
    async fn completion_guard_signals_once_on_drop() {
        let (handle, publication) = ResultAggregator::spawn([3]).unwrap();
        {
            let _guard = handle.completion_guard(3);
            handle.submit(matched("x", 12)).unwrap();
        }
        let results = publication.wait().await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn submissions_after_publication_are_refused() {
        let (handle, publication) = ResultAggregator::spawn([0]).unwrap();
        handle.worker_done(0).unwrap();
        publication.wait().await.unwrap();

        tokio::task::yield_now().await;
        let err = timeout(Duration::from_secs(1), async {
            loop {
                match handle.submit(matched("too-late", 1)) {
                    Err(e) => break e,
                    Ok(()) => tokio::task::yield_now().await,
                }
            }
        })
        .await
        .expect("aggregator kept accepting after publication");
        assert!(err.is_pipeline());
    }
}
