use std::fs;
use std::path::Path;

use crate::cmd::{HistoryLoadArgs, HistorySearchArgs};
use crate::error::TrawlError;
use crate::index::time::{index_time_documents, TimeSearcher};
use crate::model::IndexableDocument;

pub fn run_search(args: &HistorySearchArgs, data_dir: &Path) {
    let searcher = match TimeSearcher::open(data_dir) {
        Ok(s) => s,
        Err(_) => {
            eprintln!("error: no history index found. Run 'trawler history load' first.");
            std::process::exit(1);
        }
    };

    let results = match searcher.search(&args.query, args.since, args.max_count) {
        Ok(results) => results,
        Err(TrawlError::QueryParse(e)) => {
            eprintln!("error: cannot parse query: {}", e);
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("error: history search failed: {}", err);
            std::process::exit(1);
        }
    };

    for (i, result) in results.iter().enumerate() {
        let revision = if result.revision.len() > 12 {
            &result.revision[..12]
        } else {
            &result.revision
        };
        println!(
            " [{}] {}  (rev: {}, date: {}, score: {:.1})",
            i + 1,
            result.location_key,
            revision,
            result.date,
            result.score
        );
        if !result.excerpt.is_empty() {
            println!("     {}", result.excerpt);
        }
    }

    let word = if results.len() == 1 { "result" } else { "results" };
    println!("{} {}", results.len(), word);
}

pub fn run_load(args: &HistoryLoadArgs, data_dir: &Path) {
    let content = match fs::read_to_string(&args.file) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("error: cannot read '{}': {}", args.file.display(), err);
            std::process::exit(1);
        }
    };

    let batch: Vec<IndexableDocument> = match serde_json::from_str(&content) {
        Ok(batch) => batch,
        Err(err) => {
            eprintln!("error: cannot parse '{}': {}", args.file.display(), err);
            std::process::exit(1);
        }
    };

    match index_time_documents(data_dir, &batch) {
        Ok(count) => eprintln!("Indexed {} history documents", count),
        Err(err) => {
            eprintln!("error: history indexing failed: {}", err);
            std::process::exit(1);
        }
    }
}
