use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use sitecrawler_scanner::{
    CrawlConfig, CrawlEvent, Crawler, Domain, Outcome, ProgressCallback, ResultLedger, ScanError,
    VisitRecord,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub domain: Domain,
    pub config: CrawlConfig,
    pub show_progress_bars: bool,
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// One progress line for a finished visit.
pub fn format_visit_line(url: &str, title: Option<&str>, status_code: u16, outcome: Outcome) -> String {
    match outcome {
        Outcome::Success => format!("[{}] {} \"{}\"", status_code, url, title.unwrap_or("")),
        Outcome::HttpError => format!("[{}] {} (HTTP error)", status_code, url),
        Outcome::TransportError => format!("[ERR] {} (request failed)", url),
    }
}

/// Execute a crawl with the given options
/// Returns the crawl results
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<ResultLedger, ScanError> {
    let CrawlOptions {
        domain,
        config,
        show_progress_bars,
    } = options;

    // Single spinner for overall crawl progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));

    let pb_clone = progress_bar.clone();
    let count_clone = processed_count.clone();
    let engine_callback: ProgressCallback = Arc::new(move |event: &CrawlEvent| match event {
        CrawlEvent::Fetching { url } => {
            if let Some(ref pb) = pb_clone {
                let count = count_clone.load(Ordering::Relaxed);
                pb.set_message(format!("Crawling... {} pages | {}", count, extract_url_path(url)));
            }
        }
        CrawlEvent::Visited {
            url,
            title,
            status_code,
            outcome,
        } => {
            count_clone.fetch_add(1, Ordering::Relaxed);
            if let Some(ref callback) = progress_callback {
                let line = format_visit_line(url, title.as_deref(), *status_code, *outcome);
                match pb_clone {
                    Some(ref pb) => pb.suspend(|| callback(line)),
                    None => callback(line),
                }
            }
        }
        CrawlEvent::ExternalLink { .. } => {}
    });

    let crawler = Crawler::new(domain)?
        .with_config(config)
        .with_progress_callback(engine_callback);

    let ledger = crawler.crawl().await;

    // Finish progress bar (only if enabled)
    if let Some(ref pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Crawl complete! {} pages processed", total));
    }

    Ok(ledger)
}

fn status_label(visit: &VisitRecord) -> ColoredString {
    match (visit.outcome(), visit.status_code()) {
        (Outcome::TransportError, _) => "ERR".red().bold(),
        (_, code @ 200..=299) => code.to_string().green(),
        (_, code @ 300..=399) => code.to_string().cyan(),
        (_, code @ 400..=499) => code.to_string().yellow(),
        (_, code @ 500..=599) => code.to_string().red(),
        (_, code) => code.to_string().white(),
    }
}

/// Generate a human-readable summary of a crawl
pub fn generate_crawl_summary(domain: &str, ledger: &ResultLedger) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str(&format!("# Summary: {}\n", domain));
    report.push_str(&format!("  Pages crawled: {}\n", ledger.len()));
    report.push_str(&format!("  Successful: {}\n", ledger.count(Outcome::Success)));
    report.push_str(&format!("  HTTP errors: {}\n", ledger.count(Outcome::HttpError)));
    report.push_str(&format!(
        "  Failed requests: {}\n",
        ledger.count(Outcome::TransportError)
    ));
    report.push_str(&format!("  External links: {}\n", ledger.external_count()));

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    // Group by status class; 0 sorts first for failed requests
    let mut by_class: BTreeMap<u16, Vec<&VisitRecord>> = BTreeMap::new();
    for visit in ledger.visits() {
        by_class
            .entry(visit.status_code() / 100)
            .or_default()
            .push(visit);
    }

    for (class, visits) in by_class.iter() {
        let heading = match class {
            0 => "Failed requests".to_string(),
            class => format!("{}xx", class),
        };
        report.push_str(&format!("## {}\n", heading));
        report.push_str(&format!("  {} pages\n\n", visits.len()));

        for visit in visits {
            let mut line = format!("  {} {}", status_label(visit), extract_url_path(visit.url()));
            if let Some(title) = visit.title() {
                line.push_str(&format!(" {}", title.dimmed()));
            }
            report.push_str(&line);
            report.push('\n');
        }
        report.push('\n');
    }

    report
}
