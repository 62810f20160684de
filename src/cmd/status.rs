use std::fs;
use std::path::Path;

use crate::crawler::tracker::{format_unix_iso8601, read_state};
use crate::index::live_doc_count;
use crate::index::time::TimeSearcher;

pub fn run(data_dir: &Path) {
    let state_dir = data_dir.join("state");
    let mut repos: Vec<String> = Vec::new();
    if let Ok(entries) = fs::read_dir(&state_dir) {
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(repo) = name.strip_suffix(".json") {
                repos.push(repo.to_string());
            }
        }
    }
    repos.sort();

    if repos.is_empty() {
        eprintln!("No crawled repositories. Run 'trawler crawl' first.");
    } else {
        println!("repositories");
        for repo in &repos {
            match read_state(data_dir, repo) {
                Some(state) => println!(
                    "  {:<24} last run {}  ({} files observed)",
                    repo,
                    format_unix_iso8601(state.last_run_unix),
                    state.observed_files.len()
                ),
                None => println!("  {:<24} state unreadable", repo),
            }
        }
    }

    match live_doc_count(data_dir) {
        Ok(count) => println!("live index      : {} documents", count),
        Err(_) => println!("live index      : none"),
    }
    match TimeSearcher::open(data_dir).and_then(|s| s.doc_count()) {
        Ok(count) => println!("history index   : {} documents", count),
        Err(_) => println!("history index   : none"),
    }
}
