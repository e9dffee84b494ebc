use crate::common::model::Record;
use crate::errors::QueueError;
use crate::queue::RecordQueue;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

fn record(hour: u32) -> Record {
    Record::new(format!("2024-01-{:02}", hour + 1), hour as f64, -(hour as f64), hour)
}

#[tokio::test]
async fn serves_records_in_fifo_order() {
    let queue = RecordQueue::new();
    for hour in 0..5 {
        queue.enqueue(record(hour)).unwrap();
    }
    assert_eq!(queue.len(), 5);

    for hour in 0..5 {
        assert_eq!(queue.request_next().await, Some(record(hour)));
    }
    assert!(queue.is_empty());
}

#[tokio::test]
async fn records_enqueued_before_close_are_still_delivered() {
    let queue = RecordQueue::new();
    queue.enqueue(record(1)).unwrap();
    queue.enqueue(record(2)).unwrap();
    assert!(queue.close_input());

    assert_eq!(queue.request_next().await, Some(record(1)));
    assert_eq!(queue.request_next().await, Some(record(2)));
    assert_eq!(queue.request_next().await, None);
}

#[tokio::test]
async fn empty_open_queue_blocks_instead_of_ending() {
    let queue = RecordQueue::new();
    let res = timeout(Duration::from_millis(50), queue.request_next()).await;
    assert!(res.is_err(), "request_next must wait while input is open");
}

#[tokio::test]
async fn closed_and_drained_keeps_returning_none() {
    let queue = RecordQueue::new();
    queue.close_input();

    for _ in 0..100 {
        let next = timeout(Duration::from_millis(50), queue.request_next())
            .await
            .expect("closed queue must not block");
        assert!(next.is_none());
    }
}

#[tokio::test]
async fn close_input_is_idempotent() {
    let queue = RecordQueue::new();
    assert!(!queue.is_closed());
    assert!(queue.close_input());
    assert!(!queue.close_input());
    assert!(queue.is_closed());
}

#[tokio::test]
async fn enqueue_after_close_is_rejected() {
    let queue = RecordQueue::new();
    queue.close_input();

    let err = queue.enqueue(record(3)).unwrap_err();
    assert!(err.is_queue());
    assert!(matches!(err.source_as::<QueueError>(), Some(QueueError::Closed)));
    assert!(queue.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn close_wakes_every_waiting_consumer() {
    let queue = Arc::new(RecordQueue::new());
    let waiters: Vec<_> = (0..8)
        .map(|_| {
            let queue = queue.clone();
            tokio::spawn(async move { queue.request_next().await })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(20)).await;
    queue.close_input();

    for waiter in waiters {
        let next = timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter was not woken by close")
            .unwrap();
        assert!(next.is_none());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_consumers_receive_each_record_exactly_once() {
    const RECORDS: u32 = 500;
    let queue = Arc::new(RecordQueue::new());

    let consumers: Vec<_> = (0..6)
        .map(|_| {
            let queue = queue.clone();
            tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Some(record) = queue.request_next().await {
                    seen.push(record.date);
                    tokio::task::yield_now().await;
                }
                seen
            })
        })
        .collect();

    for i in 0..RECORDS {
        queue
            .enqueue(Record::new(i.to_string(), 0.0, 0.0, i % 24))
            .unwrap();
    }
    queue.close_input();

    let mut all = Vec::new();
    for consumer in consumers {
        all.extend(consumer.await.unwrap());
    }

    let unique: HashSet<_> = all.iter().cloned().collect();
    assert_eq!(all.len(), RECORDS as usize, "a record was lost or duplicated");
    assert_eq!(unique.len(), RECORDS as usize);
    assert!(queue.is_empty());
}
