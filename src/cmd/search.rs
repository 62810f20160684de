use std::path::Path;

use crate::cmd::SearchArgs;
use crate::error::TrawlError;
use crate::index::search::search_live;

pub fn run(args: &SearchArgs, data_dir: &Path) {
    if !data_dir.join("index").exists() {
        eprintln!("error: no index found. Run 'trawler crawl' first.");
        std::process::exit(1);
    }

    let results = match search_live(
        data_dir,
        &args.query,
        args.repo.as_deref(),
        args.max_count,
    ) {
        Ok(results) => results,
        Err(TrawlError::QueryParse(e)) => {
            eprintln!("error: cannot parse query: {}", e);
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("error: search failed: {}", err);
            std::process::exit(1);
        }
    };

    for (i, result) in results.iter().enumerate() {
        println!(
            " [{}] {}  (score: {:.1}, lang: {}, owner: {})",
            i + 1,
            result.location_key,
            result.score,
            result.language,
            result.owner
        );
    }

    let word = if results.len() == 1 { "result" } else { "results" };
    println!("{} {}", results.len(), word);
}
