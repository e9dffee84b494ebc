use crate::common::model::Record;
use crate::errors::{QueueError, Result};
use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// FIFO of pending records shared by the dispatcher and all workers.
///
/// Flow:
/// 1. the dispatcher calls [`enqueue`](Self::enqueue) for every record, then
///    [`close_input`](Self::close_input);
/// 2. workers call [`request_next`](Self::request_next) until it yields `None`.
///
/// The channel holds exactly one sender. Closing drops it, so the receiver
/// reports end-of-stream once the buffer drains, and keeps doing so for every
/// later call. Workers take turns on the receiver through an async mutex, so a
/// record is handed to exactly one of them.
pub struct RecordQueue {
    sender: Mutex<Option<UnboundedSender<Record>>>,
    receiver: AsyncMutex<UnboundedReceiver<Record>>,
    pending: AtomicUsize,
}

impl RecordQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded_channel();
        RecordQueue {
            sender: Mutex::new(Some(sender)),
            receiver: AsyncMutex::new(receiver),
            pending: AtomicUsize::new(0),
        }
    }

    /// Appends a record to the tail. Fails once input has been closed.
    pub fn enqueue(&self, record: Record) -> Result<()> {
        let guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = guard.as_ref().ok_or(QueueError::Closed)?;
        self.pending.fetch_add(1, Ordering::AcqRel);
        if sender.send(record).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(QueueError::Closed.into());
        }
        Ok(())
    }

    /// Waits for the next record.
    ///
    /// `None` means input is closed and every record has been handed out; it
    /// is returned immediately to all pending and future callers from then on.
    pub async fn request_next(&self) -> Option<Record> {
        let mut receiver = self.receiver.lock().await;
        let record = receiver.recv().await?;
        self.pending.fetch_sub(1, Ordering::AcqRel);
        Some(record)
    }

    /// Marks that no further records will be enqueued. Returns `true` only for
    /// the call that actually closed the queue.
    pub fn close_input(&self) -> bool {
        let closed = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if closed {
            debug!(
                "Record queue input closed with {} record(s) pending",
                self.len()
            );
        }
        closed
    }

    pub fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Records enqueued but not yet handed to a worker.
    pub fn len(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RecordQueue {
    fn default() -> Self {
        Self::new()
    }
}
