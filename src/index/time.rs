use std::fs;
use std::ops::Bound;
use std::path::{Path, PathBuf};

use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser, RangeQuery};
use tantivy::schema::Value;
use tantivy::{Index, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use crate::error::TrawlError;
use crate::model::IndexableDocument;
use crate::schema::{build_time_schema, register_code_tokenizer, TimeFields};

/// A ranked match from the time-scoped index.
#[derive(Debug)]
pub struct TimeMatch {
    pub location_key: String,
    pub display_path: String,
    pub revision: String,
    /// Year-month-day partition, e.g. 20160101.
    pub date: u64,
    pub score: f32,
    /// First content line containing a query term.
    pub excerpt: String,
}

fn time_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("time")
}

/// Writes a batch of revision documents to the time-scoped index.
///
/// No change-tracking gate: historical snapshots are committed
/// unconditionally. Documents missing a revision or partition key are
/// indexed with an empty revision / partition 0.
pub fn index_time_documents(
    data_dir: &Path,
    batch: &[IndexableDocument],
) -> Result<usize, TrawlError> {
    let dir = time_dir(data_dir);
    let index = if dir.join("meta.json").exists() {
        Index::open_in_dir(&dir)?
    } else {
        fs::create_dir_all(&dir)?;
        Index::create_in_dir(&dir, build_time_schema())?
    };
    register_code_tokenizer(&index);
    let fields = TimeFields::bind(&index.schema());

    let mut writer: IndexWriter = index.writer(50_000_000)?;
    for doc in batch {
        let date = doc
            .date_partition
            .as_deref()
            .and_then(|d| d.parse::<u64>().ok())
            .unwrap_or(0);

        let mut tdoc = TantivyDocument::new();
        tdoc.add_text(fields.doc.location, &doc.location_key);
        tdoc.add_text(fields.doc.repo, &doc.repo_name);
        tdoc.add_text(fields.doc.file_name, &doc.file_name);
        tdoc.add_text(fields.doc.display_path, &doc.display_path);
        tdoc.add_text(fields.doc.content, &doc.content);
        tdoc.add_text(fields.doc.hash, &doc.hash);
        tdoc.add_text(fields.doc.lang, &doc.language);
        tdoc.add_text(fields.doc.owner, &doc.owner);
        tdoc.add_u64(fields.doc.lines, doc.line_count);
        tdoc.add_text(fields.doc.url, &doc.remote_url);
        tdoc.add_text(fields.doc.source, &doc.source);
        tdoc.add_text(fields.revision, doc.revision.as_deref().unwrap_or(""));
        tdoc.add_u64(fields.date, date);
        writer.add_document(tdoc)?;
    }
    writer.commit()?;

    Ok(batch.len())
}

/// Read side of the time-scoped index.
pub struct TimeSearcher {
    index: Index,
    fields: TimeFields,
}

impl TimeSearcher {
    pub fn open(data_dir: &Path) -> Result<Self, TrawlError> {
        let index = Index::open_in_dir(time_dir(data_dir))?;
        register_code_tokenizer(&index);
        let fields = TimeFields::bind(&index.schema());
        Ok(Self { index, fields })
    }

    /// Relevance search restricted to documents dated at or after
    /// `min_date` (year-month-day as u64, e.g. 20160101).
    pub fn search(
        &self,
        query_str: &str,
        min_date: u64,
        limit: usize,
    ) -> Result<Vec<TimeMatch>, TrawlError> {
        let fields = self.fields;
        let parser = QueryParser::for_index(&self.index, vec![fields.doc.content]);
        let content_query = parser.parse_query(query_str)?;

        let date_query: Box<dyn Query> = Box::new(RangeQuery::new(
            Bound::Included(Term::from_field_u64(fields.date, min_date)),
            Bound::Unbounded,
        ));
        let query = BooleanQuery::new(vec![
            (Occur::Must, content_query),
            (Occur::Must, date_query),
        ]);

        let reader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let searcher = reader.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;

        let mut results = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in &top_docs {
            let doc: TantivyDocument = searcher.doc(*doc_address)?;
            let text = |field| {
                doc.get_first(field)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string()
            };

            let content = text(fields.doc.content);
            results.push(TimeMatch {
                location_key: text(fields.doc.location),
                display_path: text(fields.doc.display_path),
                revision: text(fields.revision),
                date: doc
                    .get_first(fields.date)
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0),
                score: *score,
                excerpt: pick_excerpt(&content, query_str),
            });
        }

        Ok(results)
    }

    pub fn doc_count(&self) -> Result<u64, TrawlError> {
        let reader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        Ok(reader.searcher().num_docs())
    }
}

fn pick_excerpt(content: &str, query: &str) -> String {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();

    for line in content.lines() {
        let lower = line.to_lowercase();
        if terms.iter().any(|t| lower.contains(t.as_str())) {
            return line.trim().to_string();
        }
    }
    content.lines().next().unwrap_or("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_prefers_matching_line() {
        let content = "fn alpha() {}\nfn search_index() {}\nfn omega() {}";
        assert_eq!(pick_excerpt(content, "search_index"), "fn search_index() {}");
    }

    #[test]
    fn excerpt_falls_back_to_first_line() {
        let content = "first line\nsecond line";
        assert_eq!(pick_excerpt(content, "absent"), "first line");
    }

    #[test]
    fn excerpt_is_case_insensitive() {
        let content = "    let store = EventStore::new();";
        assert_eq!(
            pick_excerpt(content, "eventstore"),
            "let store = EventStore::new();"
        );
    }
}
