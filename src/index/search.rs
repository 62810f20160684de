use std::path::Path;

use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{Index, ReloadPolicy, TantivyDocument, Term};

use crate::error::TrawlError;
use crate::schema::{register_code_tokenizer, DocFields};

/// A ranked match from the live index.
#[derive(Debug)]
pub struct LiveMatch {
    pub location_key: String,
    pub display_path: String,
    pub repo: String,
    pub language: String,
    pub owner: String,
    pub hash: String,
    pub line_count: u64,
    pub score: f32,
}

/// Relevance search over the live index, optionally restricted to one
/// repository via a filter term on the repo field.
pub fn search_live(
    data_dir: &Path,
    query_str: &str,
    repo_filter: Option<&str>,
    limit: usize,
) -> Result<Vec<LiveMatch>, TrawlError> {
    let index = Index::open_in_dir(data_dir.join("index"))?;
    register_code_tokenizer(&index);
    let fields = DocFields::bind(&index.schema());

    let parser = QueryParser::for_index(&index, vec![fields.content]);
    let base_query = parser.parse_query(query_str)?;

    let query: Box<dyn Query> = match repo_filter {
        Some(repo) => {
            let repo_query: Box<dyn Query> = Box::new(TermQuery::new(
                Term::from_field_text(fields.repo, repo),
                IndexRecordOption::Basic,
            ));
            Box::new(BooleanQuery::new(vec![
                (Occur::Must, base_query),
                (Occur::Must, repo_query),
            ]))
        }
        None => base_query,
    };

    let reader = index
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

        results.push(LiveMatch {
            location_key: text(fields.location),
            display_path: text(fields.display_path),
            repo: text(fields.repo),
            language: text(fields.lang),
            owner: text(fields.owner),
            hash: text(fields.hash),
            line_count: doc
                .get_first(fields.lines)
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            score: *score,
        });
    }

    Ok(results)
}
