use std::fs;
use std::path::Path;

use trawler::config::JobConfig;
use trawler::crawler::{run_crawl, CrawlOutcome, JobControl, SignalFlags};
use trawler::model::{RepositoryDescriptor, ScmKind};

/// Number of files written by [`sample_repo`].
pub const SAMPLE_FILE_COUNT: usize = 5;

/// Writes a small fixture repository under `root`.
pub fn sample_repo(root: &Path) {
    fs::create_dir_all(root.join("src")).expect("failed to create src dir");
    fs::write(
        root.join("src/event_store.rs"),
        "pub struct EventStore {\n    events: Vec<String>,\n}\n\nimpl EventStore {\n    pub fn append(&mut self, event: String) {\n        self.events.push(event);\n    }\n}\n",
    )
    .expect("failed to write event_store.rs");
    fs::write(
        root.join("src/models.py"),
        "class Invoice:\n    def total(self):\n        return sum(line.amount for line in self.lines)\n",
    )
    .expect("failed to write models.py");
    fs::write(
        root.join("src/server.go"),
        "package main\n\nfunc main() {\n\tstartServer()\n}\n",
    )
    .expect("failed to write server.go");
    fs::write(root.join("README.md"), "# sample\n\nA tiny fixture repository.\n")
        .expect("failed to write README.md");
    fs::write(root.join("config.json"), "{\n  \"retries\": 3\n}\n")
        .expect("failed to write config.json");
}

/// Fixture repo + separate data dir, both throwaway.
pub fn fixture() -> (tempfile::TempDir, tempfile::TempDir) {
    let repo = tempfile::tempdir().expect("failed to create repo tempdir");
    let data = tempfile::tempdir().expect("failed to create data tempdir");
    sample_repo(repo.path());
    (repo, data)
}

pub fn descriptor(name: &str) -> RepositoryDescriptor {
    RepositoryDescriptor {
        name: name.to_string(),
        scm: ScmKind::Git,
        url: format!("https://example.com/{}.git", name),
        source: "test".to_string(),
        last_run_unix: 0,
    }
}

/// Sync-mode config with report logging on, so tests can assert on
/// included entries.
pub fn crawl_config() -> JobConfig {
    JobConfig {
        low_memory: true,
        log_indexed: true,
        ..JobConfig::default()
    }
}

pub fn crawl(root: &Path, data_dir: &Path, name: &str, config: &JobConfig) -> CrawlOutcome {
    let control = SignalFlags::new();
    crawl_with_control(root, data_dir, name, config, &control)
}

pub fn crawl_with_control(
    root: &Path,
    data_dir: &Path,
    name: &str,
    config: &JobConfig,
    control: &dyn JobControl,
) -> CrawlOutcome {
    run_crawl(&descriptor(name), root, config, data_dir, control)
        .expect("crawl should succeed")
}
