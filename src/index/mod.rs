pub mod queue;
pub mod search;
pub mod time;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tantivy::{Index, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use crate::error::TrawlError;
use crate::model::IndexableDocument;
use crate::schema::{build_live_schema, register_code_tokenizer, DocFields};

/// Writer heap for both indexes.
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Write-side contract the crawl depends on. The tantivy-backed
/// [`IndexService`] is the production impl; tests substitute doubles.
pub trait IndexSink: Send + Sync {
    /// Overwrite-by-key: the same location key never duplicates.
    fn index_document(&self, doc: &IndexableDocument) -> Result<(), TrawlError>;
    fn remove_document(&self, location_key: &str) -> Result<(), TrawlError>;
    /// Aggregate indexed-line counter, incremented at submission time.
    fn increment_indexed_lines(&self, lines: u64);
}

/// The live-file index under `<data>/index`.
///
/// The writer sits behind a mutex so the synchronous emit path and the
/// queue worker can share one service; writes become visible at
/// [`IndexService::commit`], called once at end of run.
pub struct IndexService {
    index: Index,
    writer: Mutex<IndexWriter>,
    fields: DocFields,
    indexed_lines: AtomicU64,
}

impl IndexService {
    pub fn open_or_create(data_dir: &Path) -> Result<Self, TrawlError> {
        let index_dir = data_dir.join("index");
        let index = if index_dir.join("meta.json").exists() {
            Index::open_in_dir(&index_dir)?
        } else {
            fs::create_dir_all(&index_dir)?;
            Index::create_in_dir(&index_dir, build_live_schema())?
        };
        register_code_tokenizer(&index);
        let fields = DocFields::bind(&index.schema());
        let writer = index.writer(WRITER_HEAP_BYTES)?;
        Ok(Self {
            index,
            writer: Mutex::new(writer),
            fields,
            indexed_lines: AtomicU64::new(0),
        })
    }

    fn writer(&self) -> MutexGuard<'_, IndexWriter> {
        match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn commit(&self) -> Result<(), TrawlError> {
        self.writer().commit()?;
        Ok(())
    }

    pub fn doc_count(&self) -> Result<u64, TrawlError> {
        let reader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        Ok(reader.searcher().num_docs())
    }

    pub fn indexed_lines(&self) -> u64 {
        self.indexed_lines.load(Ordering::Relaxed)
    }
}

impl IndexSink for IndexService {
    fn index_document(&self, doc: &IndexableDocument) -> Result<(), TrawlError> {
        let fields = self.fields;
        let mut tdoc = TantivyDocument::new();
        tdoc.add_text(fields.location, &doc.location_key);
        tdoc.add_text(fields.repo, &doc.repo_name);
        tdoc.add_text(fields.file_name, &doc.file_name);
        tdoc.add_text(fields.display_path, &doc.display_path);
        tdoc.add_text(fields.content, &doc.content);
        tdoc.add_text(fields.hash, &doc.hash);
        tdoc.add_text(fields.lang, &doc.language);
        tdoc.add_text(fields.owner, &doc.owner);
        tdoc.add_u64(fields.lines, doc.line_count);
        tdoc.add_text(fields.url, &doc.remote_url);
        tdoc.add_text(fields.source, &doc.source);

        let writer = self.writer();
        writer.delete_term(Term::from_field_text(fields.location, &doc.location_key));
        writer.add_document(tdoc)?;
        Ok(())
    }

    fn remove_document(&self, location_key: &str) -> Result<(), TrawlError> {
        let writer = self.writer();
        writer.delete_term(Term::from_field_text(self.fields.location, location_key));
        Ok(())
    }

    fn increment_indexed_lines(&self, lines: u64) {
        self.indexed_lines.fetch_add(lines, Ordering::Relaxed);
    }
}

/// Document count of the live index without taking the writer lock.
pub fn live_doc_count(data_dir: &Path) -> Result<u64, TrawlError> {
    let index = Index::open_in_dir(data_dir.join("index"))?;
    register_code_tokenizer(&index);
    let reader = index
        .reader_builder()
        .reload_policy(ReloadPolicy::Manual)
        .try_into()?;
    Ok(reader.searcher().num_docs())
}
