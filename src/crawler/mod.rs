pub mod emitter;
pub mod filters;
pub mod provenance;
pub mod tracker;
pub mod visitor;

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use fs4::fs_std::FileExt;

use crate::classifier::{Classifier, ExtensionClassifier};
use crate::config::{IgnoreRules, JobConfig};
use crate::error::TrawlError;
use crate::index::queue::{spawn_index_worker, IndexQueue};
use crate::index::{IndexService, IndexSink};
use crate::model::{
    CrawlRun, CrawlSummary, ReportEntry, ReportOutcome, RepositoryDescriptor,
};
use emitter::DocumentEmitter;
use filters::LineExtraction;
use provenance::{GitBlameResolver, OwnerResolver, UNKNOWN_OWNER};
use tracker::RunState;
use visitor::{walk_tree, FileVisitor, VisitSignal};

/// External signals the walk polls at file-visit granularity.
/// Cooperative: neither condition is an error, both stop the walk
/// cleanly with a usable partial report.
pub trait JobControl: Sync {
    fn should_pause_or_terminate(&self) -> bool;
    fn is_deleted(&self, repo_name: &str) -> bool;
}

/// Default [`JobControl`]: a terminate flag plus the set of
/// repositories pending deletion.
#[derive(Default)]
pub struct SignalFlags {
    terminate: AtomicBool,
    deleted: Mutex<HashSet<String>>,
}

impl SignalFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_terminate(&self) {
        self.terminate.store(true, Ordering::SeqCst);
    }

    pub fn mark_deleted(&self, repo_name: &str) {
        match self.deleted.lock() {
            Ok(mut set) => {
                set.insert(repo_name.to_string());
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(repo_name.to_string());
            }
        }
    }
}

impl JobControl for SignalFlags {
    fn should_pause_or_terminate(&self) -> bool {
        self.terminate.load(Ordering::SeqCst)
    }

    fn is_deleted(&self, repo_name: &str) -> bool {
        match self.deleted.lock() {
            Ok(set) => set.contains(repo_name),
            Err(poisoned) => poisoned.into_inner().contains(repo_name),
        }
    }
}

/// The collaborators a crawl consumes, injected at construction so
/// tests can substitute doubles for any of them.
pub struct Collaborators<'a> {
    pub control: &'a dyn JobControl,
    pub classifier: &'a dyn Classifier,
    pub owners: &'a dyn OwnerResolver,
    pub sink: &'a dyn IndexSink,
}

/// What a crawl hands back: counters, the ordered report, and whether
/// the walk was cut short by a signal.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub summary: CrawlSummary,
    pub report: Vec<ReportEntry>,
    pub terminated: bool,
}

/// Exclusive advisory lock on a repository's crawl state, held for the
/// duration of a run. Released on drop.
struct CrawlLock {
    file: fs::File,
}

impl CrawlLock {
    fn acquire(data_dir: &Path, repo_name: &str) -> Result<Self, TrawlError> {
        let dir = data_dir.join("state");
        fs::create_dir_all(&dir)?;
        let file = fs::File::create(dir.join(format!("{}.lock", repo_name)))?;
        if !file.try_lock_exclusive()? {
            return Err(TrawlError::CrawlLocked {
                repo: repo_name.to_string(),
            });
        }
        Ok(Self { file })
    }
}

impl Drop for CrawlLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

struct CrawlVisitor<'a> {
    repo: &'a RepositoryDescriptor,
    root: &'a Path,
    root_unix: String,
    config: &'a JobConfig,
    rules: IgnoreRules,
    collab: &'a Collaborators<'a>,
    emitter: DocumentEmitter<'a>,
    run: CrawlRun,
    summary: CrawlSummary,
    terminated: bool,
}

impl CrawlVisitor<'_> {
    /// One file through the whole pipeline. An `Err` here is a per-file
    /// recoverable result: the caller records it and keeps walking.
    fn process_file(&mut self, file: &Path) -> Result<(), TrawlError> {
        let file_unix = provenance::normalize_separators(&file.to_string_lossy());
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent_unix = match file_unix.rfind('/') {
            Some(i) => &file_unix[..i],
            None => "",
        };

        // Configuration-level exclusion: silent, not even observed.
        if self.rules.matches(&file_unix) || self.rules.matches(parent_unix) {
            return Ok(());
        }

        self.run.observe(file_unix.clone());

        if !tracker::is_updated(file, self.repo.last_run_unix) {
            self.summary.skipped += 1;
            return Ok(());
        }

        log::debug!("extracting {}", file_unix);
        let lines = match filters::extract_lines(file, self.config.max_file_size) {
            LineExtraction::Extracted(lines) => lines,
            LineExtraction::Failed(detail) => {
                self.run.forget(&file_unix);
                self.exclude(file_unix, detail);
                return Ok(());
            }
        };

        let minified = filters::check_minified(&lines, &file_name);
        if minified.minified {
            self.exclude(
                file_unix,
                format!("minified, average line length {}", minified.avg_line_length),
            );
            return Ok(());
        }

        if filters::is_empty(&lines) {
            self.exclude(file_unix, "empty file".to_string());
            return Ok(());
        }

        let binary = filters::check_binary(&lines);
        if binary.binary {
            self.run.forget(&file_unix);
            self.exclude(file_unix, binary.reason.to_string());
            return Ok(());
        }

        let content = lines.join("\n");
        let hash = provenance::content_hash(&content);
        let language = self.collab.classifier.guess_language(&file_name, &lines);
        let rel_path = provenance::relative_path(&self.root_unix, &file_unix);
        let location_key = provenance::location_filename(&self.repo.name, &rel_path);
        let owner = self
            .collab
            .owners
            .resolve_owner(&lines, &rel_path, &self.repo.name, self.root)
            .unwrap_or_else(|| UNKNOWN_OWNER.to_string());
        let display_path = provenance::display_location(&location_key, &file_unix, self.repo);
        let line_count = lines.len() as u64;

        let doc = crate::model::IndexableDocument {
            path: file_unix.clone(),
            repo_name: self.repo.name.clone(),
            file_name,
            rel_path,
            display_path,
            location_key,
            hash,
            language: language.to_string(),
            line_count,
            content,
            remote_url: self.repo.url.clone(),
            owner,
            source: self.repo.source.clone(),
            revision: None,
            date_partition: None,
        };

        // Index-write failures are the index's error domain; the walk
        // never stops for them.
        match self.emitter.emit(doc) {
            Ok(()) => {
                self.summary.emitted += 1;
                self.summary.lines += line_count;
            }
            Err(err) => {
                log::error!(
                    "emit failed for {} in repo {}: {}",
                    file_unix,
                    self.repo.name,
                    err
                );
            }
        }

        self.summary.included += 1;
        if self.config.log_indexed {
            self.run
                .record(file_unix, ReportOutcome::Included, String::new());
        }
        Ok(())
    }

    fn exclude(&mut self, path: String, detail: String) {
        self.run.record(path, ReportOutcome::Excluded, detail);
        self.summary.excluded += 1;
    }

    fn poll_signals(&mut self) -> bool {
        if self.collab.control.should_pause_or_terminate()
            || self.collab.control.is_deleted(&self.repo.name)
        {
            self.terminated = true;
            return true;
        }
        false
    }
}

impl FileVisitor for CrawlVisitor<'_> {
    fn enter_directory(&mut self, dir: &Path) -> VisitSignal {
        if self.poll_signals() {
            return VisitSignal::Terminate;
        }
        let dir_unix = provenance::normalize_separators(&dir.to_string_lossy());
        if self.rules.matches(&dir_unix) {
            return VisitSignal::SkipSubtree;
        }
        VisitSignal::Continue
    }

    fn visit_file(&mut self, file: &Path) -> VisitSignal {
        if self.poll_signals() {
            return VisitSignal::Terminate;
        }
        if let Err(err) = self.process_file(file) {
            // Continue at all costs: one bad file never aborts the run.
            let path = provenance::normalize_separators(&file.to_string_lossy());
            log::warn!(
                "recoverable failure for {} in repo {}: {}",
                path,
                self.repo.name,
                err
            );
            self.exclude(path, err.to_string());
        }
        VisitSignal::Continue
    }

    fn visit_failed(&mut self, path: Option<&Path>, detail: &str) -> VisitSignal {
        let path = path
            .map(|p| provenance::normalize_separators(&p.to_string_lossy()))
            .unwrap_or_default();
        log::warn!("visit failed for '{}': {}", path, detail);
        self.exclude(path, detail.to_string());
        VisitSignal::Continue
    }
}

/// Runs one crawl with explicitly injected collaborators.
///
/// Holds the repository's state lock for the duration. Only a
/// completed (non-terminated) run prunes disappeared files and
/// advances the incremental baseline; a terminated run returns its
/// partial report with the old baseline intact.
pub fn crawl_repository(
    repo: &RepositoryDescriptor,
    root: &Path,
    config: &JobConfig,
    data_dir: &Path,
    collab: &Collaborators<'_>,
    queue: Option<&IndexQueue>,
) -> Result<CrawlOutcome, TrawlError> {
    let _lock = CrawlLock::acquire(data_dir, &repo.name)?;

    let rules = IgnoreRules::compile(&config.ignore_patterns)?;
    let state = tracker::read_state(data_dir, &repo.name).unwrap_or_default();
    let repo = RepositoryDescriptor {
        last_run_unix: state.last_run_unix,
        ..repo.clone()
    };

    let started_unix = tracker::unix_now();
    let start = Instant::now();
    let root_unix = provenance::normalize_separators(&root.to_string_lossy());

    let emitter = match queue {
        Some(queue) => DocumentEmitter::queued(collab.sink, queue),
        None => DocumentEmitter::direct(collab.sink),
    };

    let mut crawl_visitor = CrawlVisitor {
        repo: &repo,
        root,
        root_unix: root_unix.clone(),
        config,
        rules,
        collab,
        emitter,
        run: CrawlRun::new(started_unix),
        summary: CrawlSummary::default(),
        terminated: false,
    };

    log::info!("crawl started for repo {} at {}", repo.name, root.display());
    walk_tree(root, &mut crawl_visitor);

    let CrawlVisitor {
        run,
        mut summary,
        terminated,
        ..
    } = crawl_visitor;
    summary.elapsed_ms = start.elapsed().as_millis() as u64;

    if terminated {
        log::info!(
            "crawl terminated early for repo {}; baseline left unchanged",
            repo.name
        );
        let (_, report) = run.into_parts();
        return Ok(CrawlOutcome {
            summary,
            report,
            terminated: true,
        });
    }

    // Prune files that were present last run but not observed now.
    for old_path in state.observed_files.difference(run.observed()) {
        let rel = provenance::relative_path(&root_unix, old_path);
        let key = provenance::location_filename(&repo.name, &rel);
        match collab.sink.remove_document(&key) {
            Ok(()) => summary.removed += 1,
            Err(err) => log::error!("failed to remove {}: {}", key, err),
        }
    }

    let (observed, report) = run.into_parts();
    tracker::write_state(
        data_dir,
        &repo.name,
        &RunState {
            last_run_unix: started_unix,
            observed_files: observed,
        },
    )?;
    if config.log_indexed {
        write_report(data_dir, &repo.name, &report)?;
    }

    log::info!(
        "crawl finished for repo {}: {} included, {} excluded, {} unchanged, {} removed in {}ms",
        repo.name,
        summary.included,
        summary.excluded,
        summary.skipped,
        summary.removed,
        summary.elapsed_ms
    );

    Ok(CrawlOutcome {
        summary,
        report,
        terminated: false,
    })
}

/// Production wiring around [`crawl_repository`]: builds the tantivy
/// service and default collaborators, runs the queue worker when not
/// in low-memory mode, and commits once at end of run.
pub fn run_crawl(
    repo: &RepositoryDescriptor,
    root: &Path,
    config: &JobConfig,
    data_dir: &Path,
    control: &dyn JobControl,
) -> Result<CrawlOutcome, TrawlError> {
    let service = Arc::new(IndexService::open_or_create(data_dir)?);
    let classifier = ExtensionClassifier;
    let owners = GitBlameResolver;
    let collab = Collaborators {
        control,
        classifier: &classifier,
        owners: &owners,
        sink: service.as_ref(),
    };

    let outcome = if config.low_memory {
        crawl_repository(repo, root, config, data_dir, &collab, None)?
    } else {
        let (queue, rx) = IndexQueue::bounded(config.queue_capacity);
        let worker = spawn_index_worker(rx, Arc::clone(&service) as Arc<dyn IndexSink>);
        let outcome = crawl_repository(repo, root, config, data_dir, &collab, Some(&queue));
        drop(queue);
        if worker.join().is_err() {
            log::error!("index worker panicked");
        }
        outcome?
    };

    service.commit()?;
    Ok(outcome)
}

fn write_report(
    data_dir: &Path,
    repo_name: &str,
    report: &[ReportEntry],
) -> Result<(), TrawlError> {
    let dir = data_dir.join("reports");
    fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(report)?;
    fs::write(dir.join(format!("{}.json", repo_name)), json)?;
    Ok(())
}
