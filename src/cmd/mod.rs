pub mod crawl;
pub mod history;
pub mod search;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::model::ScmKind;

#[derive(Parser)]
#[command(
    name = "trawler",
    about = "Incremental repository crawler and code search index",
    version
)]
pub struct Cli {
    /// Directory holding the indexes and crawl state
    #[arg(long = "data-dir", global = true, default_value = ".trawler")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Crawl a repository checkout and index its files
    Crawl(CrawlArgs),
    /// Search the live index
    Search(SearchArgs),
    /// Time-scoped history index operations
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Show per-repository crawl state and index counts
    Status,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScmArg {
    File,
    Git,
}

impl From<ScmArg> for ScmKind {
    fn from(arg: ScmArg) -> Self {
        match arg {
            ScmArg::File => ScmKind::File,
            ScmArg::Git => ScmKind::Git,
        }
    }
}

#[derive(Parser)]
pub struct CrawlArgs {
    /// Path to the repository checkout
    pub root: PathBuf,

    /// Repository name (unique index key)
    #[arg(long)]
    pub name: String,

    /// Source-control kind of the repository
    #[arg(long, value_enum, default_value_t = ScmArg::Git)]
    pub scm: ScmArg,

    /// Remote origin URL; defaults to the local root for file repositories
    #[arg(long, default_value = "")]
    pub url: String,

    /// Originating data source tag stored on every document
    #[arg(long, default_value = "crawl")]
    pub source: String,

    /// Write documents inline instead of through the async queue
    #[arg(long = "low-memory")]
    pub low_memory: bool,

    /// Record included files in the report and write it to disk
    #[arg(long = "log-indexed")]
    pub log_indexed: bool,

    /// Glob pattern to exclude (repeatable)
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    /// Capacity of the async index queue
    #[arg(long = "queue-capacity", default_value_t = 1024)]
    pub queue_capacity: usize,

    /// Skip files larger than this many bytes
    #[arg(long = "max-file-size", default_value_t = 1_048_576)]
    pub max_file_size: u64,
}

#[derive(Parser)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Restrict results to one repository
    #[arg(long)]
    pub repo: Option<String>,

    /// Maximum number of results
    #[arg(short = 'm', long = "max-count", default_value_t = 10)]
    pub max_count: usize,
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Search historical content at or after a date
    Search(HistorySearchArgs),
    /// Load a JSON batch of revision documents into the time index
    Load(HistoryLoadArgs),
}

#[derive(Parser)]
pub struct HistorySearchArgs {
    /// Search query
    pub query: String,

    /// Lower date bound as YYYYMMDD (0 = unbounded)
    #[arg(long, default_value_t = 0)]
    pub since: u64,

    /// Maximum number of results
    #[arg(short = 'm', long = "max-count", default_value_t = 10)]
    pub max_count: usize,
}

#[derive(Parser)]
pub struct HistoryLoadArgs {
    /// JSON file holding an array of documents with revision and
    /// date partition set
    pub file: PathBuf,
}
