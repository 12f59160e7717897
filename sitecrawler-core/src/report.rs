// Report writers for crawl results

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use sitecrawler_scanner::{ResultLedger, VisitRecord};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const PAGES_HEADER: [&str; 3] = ["URL", "Title", "Status Code"];
pub const EXTERNAL_HEADER: [&str; 1] = ["External URL"];

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ReportFormat::Csv),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }
}

/// Where a crawl's reports go. `external` is only set when external links
/// get a file of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub pages: PathBuf,
    pub external: Option<PathBuf>,
}

/// `URL,Title,Status Code` followed by one row per visit, in visit order.
/// Absent titles are written as empty cells.
pub fn write_pages_csv<W: Write>(writer: W, visits: &[VisitRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(PAGES_HEADER)?;
    for visit in visits {
        let status = visit.status_code().to_string();
        csv_writer.write_record([visit.url(), visit.title().unwrap_or(""), status.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// `External URL` followed by one row per link. Links are written as given.
pub fn write_external_csv<W: Write>(writer: W, links: &[String]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXTERNAL_HEADER)?;
    for link in links {
        csv_writer.write_record([link.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn generate_json_report(
    domain: &str,
    ledger: &ResultLedger,
    include_external: bool,
) -> std::result::Result<String, serde_json::Error> {
    let external_links = include_external.then(|| ledger.external_links());
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "sitecrawler",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "domain": domain,
            "summary": {
                "pages": ledger.len(),
                "external_links": ledger.external_count()
            },
            "visits": ledger.visits(),
            "external_links": external_links
        }
    });

    serde_json::to_string_pretty(&json_report)
}

/// `{domain}_{YYYY-MM-DDTHHMM}` with characters that are awkward in file
/// names replaced by `_`.
pub fn report_file_stem<Tz: TimeZone>(domain: &str, timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let safe_domain: String = domain
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' | '[' | ']' => '_',
            c => c,
        })
        .collect();
    format!("{}_{}", safe_domain, timestamp.format("%Y-%m-%dT%H%M"))
}

pub fn report_paths<Tz: TimeZone>(
    output_dir: &Path,
    domain: &str,
    timestamp: &DateTime<Tz>,
    format: ReportFormat,
    include_external: bool,
) -> ReportPaths
where
    Tz::Offset: std::fmt::Display,
{
    let stem = report_file_stem(domain, timestamp);
    let pages = output_dir.join(format!("{}.{}", stem, format.extension()));
    let external = match format {
        ReportFormat::Csv if include_external => {
            Some(output_dir.join(format!("{}_external.csv", stem)))
        }
        _ => None,
    };
    ReportPaths { pages, external }
}

/// Expands `~` and environment variables in a user-supplied directory.
pub fn expand_output_dir(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}

/// Write every report named in `paths`, creating the parent directory if needed.
/// JSON reports carry external links inline when `include_external` is set.
pub fn save_reports(
    domain: &str,
    ledger: &ResultLedger,
    paths: &ReportPaths,
    format: ReportFormat,
    include_external: bool,
) -> Result<()> {
    if let Some(parent) = paths.pages.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    match format {
        ReportFormat::Csv => {
            write_pages_csv(BufWriter::new(File::create(&paths.pages)?), ledger.visits())?;
            if let Some(ref external) = paths.external {
                write_external_csv(
                    BufWriter::new(File::create(external)?),
                    &ledger.external_links(),
                )?;
            }
        }
        ReportFormat::Json => {
            let content = generate_json_report(domain, ledger, include_external)?;
            save_report(&content, &paths.pages)?;
        }
    }

    info!("Reports saved to {}", paths.pages.display());
    Ok(())
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
