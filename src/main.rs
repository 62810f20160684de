use clap::Parser;

use trawler::cmd::{self, Cli, Command, HistoryAction};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Crawl(args) => cmd::crawl::run(args, &cli.data_dir),
        Command::Search(args) => cmd::search::run(args, &cli.data_dir),
        Command::History { action } => match action {
            HistoryAction::Search(args) => cmd::history::run_search(args, &cli.data_dir),
            HistoryAction::Load(args) => cmd::history::run_load(args, &cli.data_dir),
        },
        Command::Status => cmd::status::run(&cli.data_dir),
    }
}
