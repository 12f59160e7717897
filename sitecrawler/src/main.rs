use colored::Colorize;
use sitecrawler::commands::command_argument_builder;
use sitecrawler::handlers::{handle_crawl, init_tracing};

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let matches = cmd.get_matches();

    init_tracing(matches.get_flag("verbose"));

    if let Err(e) = handle_crawl(&matches).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
