use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Source-control kind of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScmKind {
    /// A plain directory tree; the configured URL is the local root.
    File,
    Git,
}

impl ScmKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScmKind::File => "file",
            ScmKind::Git => "git",
        }
    }
}

/// The repository being indexed. Owned by the job orchestration layer
/// and read-only during a crawl.
#[derive(Debug, Clone)]
pub struct RepositoryDescriptor {
    /// Unique key; also the first component of every location key.
    pub name: String,
    pub scm: ScmKind,
    /// Remote origin URL, or the local root for `file` repositories.
    pub url: String,
    /// Originating data source tag carried into every document.
    pub source: String,
    /// Start time (unix seconds) of the last completed run; 0 when the
    /// repository has never been crawled.
    pub last_run_unix: u64,
}

/// The unit of work sent to the index.
///
/// `location_key` is the index's primary key, unique per
/// (repository, relative path); re-indexing the same key overwrites,
/// never duplicates. `revision` and `date_partition` are only set on
/// documents bound for the time-scoped index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexableDocument {
    /// Absolute unix-style path of the file on disk.
    pub path: String,
    pub repo_name: String,
    pub file_name: String,
    /// Path relative to the repository root.
    pub rel_path: String,
    /// Path as shown to users, stripped of local filesystem prefix.
    pub display_path: String,
    pub location_key: String,
    /// md5 hex digest of the content, for dedup/identity.
    pub hash: String,
    pub language: String,
    pub line_count: u64,
    pub content: String,
    pub remote_url: String,
    pub owner: String,
    pub source: String,
    pub revision: Option<String>,
    /// Year-month-day partition key, e.g. "20160101".
    pub date_partition: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportOutcome {
    Included,
    Excluded,
}

impl ReportOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportOutcome::Included => "included",
            ReportOutcome::Excluded => "excluded",
        }
    }
}

/// One line of the crawl report: what happened to a path and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub path: String,
    pub outcome: ReportOutcome,
    pub detail: String,
}

/// One traversal pass over a repository's tree.
///
/// Owns the observed-file set and the report; both are accumulated
/// through the visitor and handed back to the controller when the walk
/// ends, so partial-result semantics stay unambiguous. Never shared
/// across concurrent walks.
#[derive(Debug)]
pub struct CrawlRun {
    pub started_unix: u64,
    observed_files: BTreeSet<String>,
    report: Vec<ReportEntry>,
}

impl CrawlRun {
    pub fn new(started_unix: u64) -> Self {
        Self {
            started_unix,
            observed_files: BTreeSet::new(),
            report: Vec::new(),
        }
    }

    /// Registers a path as present in this run.
    pub fn observe(&mut self, path: String) {
        self.observed_files.insert(path);
    }

    /// Removes a path from the observed set. Extraction failures and
    /// binary files are treated as "not present" so a later run prunes
    /// them from the index.
    pub fn forget(&mut self, path: &str) {
        self.observed_files.remove(path);
    }

    pub fn record(&mut self, path: String, outcome: ReportOutcome, detail: String) {
        self.report.push(ReportEntry {
            path,
            outcome,
            detail,
        });
    }

    pub fn observed(&self) -> &BTreeSet<String> {
        &self.observed_files
    }

    pub fn report(&self) -> &[ReportEntry] {
        &self.report
    }

    pub fn into_parts(self) -> (BTreeSet<String>, Vec<ReportEntry>) {
        (self.observed_files, self.report)
    }
}

/// Counters accumulated over one crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// Files that passed every filter stage.
    pub included: usize,
    /// Files recorded as excluded (filter verdicts and failures).
    pub excluded: usize,
    /// Files skipped by the change tracker as unchanged.
    pub skipped: usize,
    /// Documents handed to the emitter.
    pub emitted: usize,
    /// Documents removed because their file disappeared since last run.
    pub removed: usize,
    /// Total lines across emitted documents.
    pub lines: u64,
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_then_forget() {
        let mut run = CrawlRun::new(0);
        run.observe("/repo/a.rs".to_string());
        run.observe("/repo/b.bin".to_string());
        run.forget("/repo/b.bin");

        assert!(run.observed().contains("/repo/a.rs"));
        assert!(!run.observed().contains("/repo/b.bin"));
    }

    #[test]
    fn report_preserves_order() {
        let mut run = CrawlRun::new(0);
        run.record("a".into(), ReportOutcome::Included, String::new());
        run.record("b".into(), ReportOutcome::Excluded, "binary".into());

        let report = run.report();
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].path, "a");
        assert_eq!(report[1].outcome, ReportOutcome::Excluded);
        assert_eq!(report[1].detail, "binary");
    }

    #[test]
    fn document_serde_round_trip() {
        let doc = IndexableDocument {
            path: "/repos/demo/src/lib.rs".into(),
            repo_name: "demo".into(),
            file_name: "lib.rs".into(),
            rel_path: "src/lib.rs".into(),
            display_path: "src/lib.rs".into(),
            location_key: "demo/src/lib.rs".into(),
            hash: "d41d8cd98f00b204e9800998ecf8427e".into(),
            language: "rust".into(),
            line_count: 1,
            content: "pub fn demo() {}".into(),
            remote_url: "https://example.com/demo.git".into(),
            owner: "Unknown".into(),
            source: "test".into(),
            revision: Some("99a5a27".into()),
            date_partition: Some("20160101".into()),
        };
        let json = serde_json::to_string(&doc).unwrap();
        let parsed: IndexableDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.location_key, doc.location_key);
        assert_eq!(parsed.date_partition.as_deref(), Some("20160101"));
    }
}
