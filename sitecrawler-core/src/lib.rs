pub mod crawl;
pub mod report;

pub use crawl::{
    CrawlOptions, CrawlProgressCallback, execute_crawl, extract_url_path, generate_crawl_summary,
};
pub use report::{ReportError, ReportFormat, ReportPaths};
