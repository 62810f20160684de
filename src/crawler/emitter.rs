use crate::error::TrawlError;
use crate::index::queue::IndexQueue;
use crate::index::IndexSink;
use crate::model::IndexableDocument;

/// Routes finished documents to the index.
///
/// Low-memory mode writes inline with the walk; otherwise documents go
/// onto the bounded queue for the indexing worker, and the aggregate
/// line counter is incremented at submission time so progress metrics
/// reflect submitted, not yet persisted, work. Append-only from the
/// walker's perspective: enqueue blocks under backpressure but index
/// write failures never propagate back into the walk.
pub struct DocumentEmitter<'a> {
    sink: &'a dyn IndexSink,
    queue: Option<&'a IndexQueue>,
}

impl<'a> DocumentEmitter<'a> {
    /// Synchronous delivery (low-memory mode).
    pub fn direct(sink: &'a dyn IndexSink) -> Self {
        Self { sink, queue: None }
    }

    /// Asynchronous delivery through the bounded queue.
    pub fn queued(sink: &'a dyn IndexSink, queue: &'a IndexQueue) -> Self {
        Self {
            sink,
            queue: Some(queue),
        }
    }

    pub fn emit(&self, doc: IndexableDocument) -> Result<(), TrawlError> {
        self.sink.increment_indexed_lines(doc.line_count);
        match self.queue {
            None => self.sink.index_document(&doc),
            Some(queue) => queue.push(doc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::queue::IndexQueue;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSink {
        indexed: AtomicUsize,
        lines: AtomicU64,
    }

    impl IndexSink for CountingSink {
        fn index_document(&self, _doc: &IndexableDocument) -> Result<(), TrawlError> {
            self.indexed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn remove_document(&self, _location_key: &str) -> Result<(), TrawlError> {
            Ok(())
        }

        fn increment_indexed_lines(&self, lines: u64) {
            self.lines.fetch_add(lines, Ordering::SeqCst);
        }
    }

    fn doc(lines: u64) -> IndexableDocument {
        IndexableDocument {
            path: "/r/a.rs".into(),
            repo_name: "r".into(),
            file_name: "a.rs".into(),
            rel_path: "a.rs".into(),
            display_path: "a.rs".into(),
            location_key: "r/a.rs".into(),
            hash: String::new(),
            language: "rust".into(),
            line_count: lines,
            content: String::new(),
            remote_url: String::new(),
            owner: "Unknown".into(),
            source: "test".into(),
            revision: None,
            date_partition: None,
        }
    }

    #[test]
    fn direct_mode_writes_inline() {
        let sink = CountingSink::default();
        let emitter = DocumentEmitter::direct(&sink);

        emitter.emit(doc(7)).unwrap();

        assert_eq!(sink.indexed.load(Ordering::SeqCst), 1);
        assert_eq!(sink.lines.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn queued_mode_counts_lines_before_drain() {
        let sink = CountingSink::default();
        let (queue, rx) = IndexQueue::bounded(4);
        let emitter = DocumentEmitter::queued(&sink, &queue);

        emitter.emit(doc(3)).unwrap();

        // Counter reflects submission, not persistence.
        assert_eq!(sink.lines.load(Ordering::SeqCst), 3);
        assert_eq!(sink.indexed.load(Ordering::SeqCst), 0);
        assert_eq!(rx.recv().unwrap().line_count, 3);
    }

    #[test]
    fn queued_mode_fails_when_worker_is_gone() {
        let sink = CountingSink::default();
        let (queue, rx) = IndexQueue::bounded(4);
        drop(rx);
        let emitter = DocumentEmitter::queued(&sink, &queue);

        assert!(matches!(emitter.emit(doc(1)), Err(TrawlError::QueueClosed)));
    }
}
