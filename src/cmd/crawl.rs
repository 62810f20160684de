use std::path::Path;

use crate::cmd::{CrawlArgs, ScmArg};
use crate::config::JobConfig;
use crate::crawler::{run_crawl, SignalFlags};
use crate::error::TrawlError;
use crate::model::RepositoryDescriptor;

pub fn run(args: &CrawlArgs, data_dir: &Path) {
    let root = match args.root.canonicalize() {
        Ok(p) => p,
        Err(err) => {
            eprintln!(
                "error: cannot resolve root path '{}': {}",
                args.root.display(),
                err
            );
            std::process::exit(1);
        }
    };

    // file-scheme repositories use the local root as their URL unless
    // one was given; the display-path computation depends on it.
    let url = if args.url.is_empty() && args.scm == ScmArg::File {
        root.to_string_lossy().into_owned()
    } else {
        args.url.clone()
    };

    let repo = RepositoryDescriptor {
        name: args.name.clone(),
        scm: args.scm.into(),
        url,
        source: args.source.clone(),
        last_run_unix: 0,
    };
    let config = JobConfig {
        ignore_patterns: args.exclude.clone(),
        low_memory: args.low_memory,
        log_indexed: args.log_indexed,
        queue_capacity: args.queue_capacity,
        max_file_size: args.max_file_size,
    };
    let control = SignalFlags::new();

    match run_crawl(&repo, &root, &config, data_dir, &control) {
        Ok(outcome) => {
            if outcome.terminated {
                eprintln!("Crawl stopped early; partial results committed, baseline unchanged.");
            }
            let s = &outcome.summary;
            eprintln!(
                "Crawled {}: {} included, {} excluded, {} unchanged, {} removed, {} lines in {}ms",
                repo.name, s.included, s.excluded, s.skipped, s.removed, s.lines, s.elapsed_ms
            );
        }
        Err(err) => {
            match &err {
                TrawlError::CrawlLocked { repo } => {
                    eprintln!(
                        "error: repository '{}' is already being crawled by another process.",
                        repo
                    );
                }
                TrawlError::Pattern(e) => {
                    eprintln!("error: invalid --exclude pattern: {}", e);
                }
                TrawlError::Tantivy(e) => {
                    eprintln!("error: index engine failure: {}", e);
                }
                TrawlError::Io(e) => {
                    eprintln!("error: I/O failure during crawl: {}", e);
                }
                _ => {
                    eprintln!("error: crawl failed: {}", err);
                }
            }
            std::process::exit(1);
        }
    }
}
