use std::fmt;

/// Structured error type for trawler operations.
///
/// Used across the public API so callers can distinguish error kinds
/// (e.g. missing index vs. corrupt state vs. query parse failure) and
/// produce targeted, actionable messages.
#[derive(Debug)]
pub enum TrawlError {
    /// File system I/O failure.
    Io(std::io::Error),
    /// Tantivy index operation failure (open, create, search, commit).
    Tantivy(tantivy::TantivyError),
    /// Tantivy query parse failure (invalid query syntax).
    QueryParse(tantivy::query::QueryParserError),
    /// State/report serialization or deserialization failure.
    Json(serde_json::Error),
    /// Invalid ignore glob pattern in the crawl configuration.
    Pattern(glob::PatternError),
    /// The async index queue's worker is gone; nothing will drain it.
    QueueClosed,
    /// Another crawl of the same repository holds the state lock.
    CrawlLocked { repo: String },
}

impl fmt::Display for TrawlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrawlError::Io(e) => write!(f, "{}", e),
            TrawlError::Tantivy(e) => write!(f, "{}", e),
            TrawlError::QueryParse(e) => write!(f, "query parse error: {}", e),
            TrawlError::Json(e) => write!(f, "state error: {}", e),
            TrawlError::Pattern(e) => write!(f, "invalid ignore pattern: {}", e),
            TrawlError::QueueClosed => write!(f, "index queue is closed"),
            TrawlError::CrawlLocked { repo } => write!(
                f,
                "repository '{}' is already being crawled by another process",
                repo
            ),
        }
    }
}

impl std::error::Error for TrawlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrawlError::Io(e) => Some(e),
            TrawlError::Tantivy(e) => Some(e),
            TrawlError::QueryParse(e) => Some(e),
            TrawlError::Json(e) => Some(e),
            TrawlError::Pattern(e) => Some(e),
            TrawlError::QueueClosed => None,
            TrawlError::CrawlLocked { .. } => None,
        }
    }
}

impl From<std::io::Error> for TrawlError {
    fn from(e: std::io::Error) -> Self {
        TrawlError::Io(e)
    }
}

impl From<tantivy::TantivyError> for TrawlError {
    fn from(e: tantivy::TantivyError) -> Self {
        TrawlError::Tantivy(e)
    }
}

impl From<tantivy::query::QueryParserError> for TrawlError {
    fn from(e: tantivy::query::QueryParserError) -> Self {
        TrawlError::QueryParse(e)
    }
}

impl From<serde_json::Error> for TrawlError {
    fn from(e: serde_json::Error) -> Self {
        TrawlError::Json(e)
    }
}

impl From<glob::PatternError> for TrawlError {
    fn from(e: glob::PatternError) -> Self {
        TrawlError::Pattern(e)
    }
}
