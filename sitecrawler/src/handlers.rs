use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use sitecrawler_core::crawl::{
    CrawlOptions, CrawlProgressCallback, execute_crawl, generate_crawl_summary,
};
use sitecrawler_core::report::{ReportFormat, expand_output_dir, report_paths, save_reports};
use sitecrawler_scanner::{CrawlConfig, Domain, HostMatch};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info};

/// Install the fmt subscriber on stderr. DEBUG with `--verbose`, WARN otherwise.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build the crawl configuration from parsed command-line flags
pub fn build_config(args: &ArgMatches) -> CrawlConfig {
    let host_match = if args.get_flag("include-subdomains") {
        HostMatch::Contains
    } else {
        HostMatch::Exact
    };

    CrawlConfig {
        recursive: args.get_flag("recursive"),
        collect_external: args.get_flag("external"),
        pages_only: args.get_flag("pages-only"),
        host_match,
        delay: Duration::from_secs(args.get_one::<u64>("delay").copied().unwrap_or(1)),
        timeout: Duration::from_secs(args.get_one::<u64>("timeout").copied().unwrap_or(10)),
    }
}

pub fn report_format(args: &ArgMatches) -> ReportFormat {
    args.get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Csv)
}

pub fn output_dir(args: &ArgMatches) -> PathBuf {
    let raw = args
        .get_one::<String>("output-dir")
        .map(String::as_str)
        .unwrap_or(".");
    expand_output_dir(raw)
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn describe_mode(config: &CrawlConfig) -> String {
    let mut parts = vec![if config.recursive {
        "recursive"
    } else {
        "single level"
    }];
    if config.collect_external {
        parts.push("collecting external links");
    }
    if config.pages_only {
        parts.push("pages only");
    }
    if config.host_match == HostMatch::Contains {
        parts.push("including subdomains");
    }
    parts.join(", ")
}

pub async fn handle_crawl(args: &ArgMatches) -> Result<()> {
    let raw_domain = args
        .get_one::<String>("DOMAIN")
        .context("A domain to crawl is required")?;
    let domain = Domain::parse(raw_domain)?;
    let config = build_config(args);
    let format = report_format(args);
    let output_dir = output_dir(args);
    let quiet = args.get_flag("quiet");
    let collect_external = config.collect_external;
    let authority = domain.authority().to_string();

    if !quiet {
        print_divider();
        println!("{} {}", "Crawling".bright_cyan().bold(), domain.seed());
        println!("Mode: {}", describe_mode(&config));
        println!("Delay: {}s | Timeout: {}s", config.delay.as_secs(), config.timeout.as_secs());
        print_divider();
    }
    info!("Starting crawl of {}", domain.seed());

    let progress_callback: Option<CrawlProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|line: String| println!("{}", line)))
    };

    let options = CrawlOptions {
        domain,
        config,
        show_progress_bars: !quiet,
    };
    let ledger = execute_crawl(options, progress_callback).await?;
    info!("Crawl finished: {} pages", ledger.len());

    let paths = report_paths(
        &output_dir,
        &authority,
        &chrono::Local::now(),
        format,
        collect_external,
    );
    save_reports(&authority, &ledger, &paths, format, collect_external)
        .with_context(|| format!("Failed to write report to {}", paths.pages.display()))?;

    if !quiet {
        println!();
        print!("{}", generate_crawl_summary(&authority, &ledger));
    }

    println!("{} Report saved to: {}", "✓".green().bold(), paths.pages.display());
    if let Some(ref external) = paths.external {
        println!(
            "{} External links saved to: {}",
            "✓".green().bold(),
            external.display()
        );
    }

    Ok(())
}
