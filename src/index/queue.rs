use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::error::TrawlError;
use crate::index::IndexSink;
use crate::model::IndexableDocument;

/// Bounded, concurrency-safe handoff between walkers and the indexing
/// worker.
///
/// Backpressure policy: blocking send. A full queue blocks the walker
/// until the worker frees capacity; a disconnected worker surfaces
/// [`TrawlError::QueueClosed`]. The sender side is cheap to clone, so
/// independent crawls can feed one worker; ordering is FIFO per
/// sender, with no guarantee across repositories.
pub struct IndexQueue {
    tx: SyncSender<IndexableDocument>,
}

impl IndexQueue {
    pub fn bounded(capacity: usize) -> (Self, Receiver<IndexableDocument>) {
        let (tx, rx) = sync_channel(capacity);
        (Self { tx }, rx)
    }

    pub fn push(&self, doc: IndexableDocument) -> Result<(), TrawlError> {
        self.tx.send(doc).map_err(|_| TrawlError::QueueClosed)
    }
}

impl Clone for IndexQueue {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Spawns the indexing worker: drains the queue until every sender is
/// dropped, logging (never propagating) index-write failures — those
/// are the index's own error domain, not the crawl's.
pub fn spawn_index_worker(
    rx: Receiver<IndexableDocument>,
    sink: Arc<dyn IndexSink>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for doc in rx {
            if let Err(err) = sink.index_document(&doc) {
                log::error!("index write failed for {}: {}", doc.location_key, err);
            }
        }
    })
}
