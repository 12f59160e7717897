pub mod canonical;
pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod html;
pub mod page;
pub mod result;
pub mod visited;

pub use canonical::{CanonicalUrl, Domain, HostMatch, UrlClass, UrlNormalizer};
pub use crawler::{CrawlConfig, CrawlEvent, Crawler, ProgressCallback};
pub use error::{FetchError, NormalizeError, ScanError};
pub use fetcher::{FetchedPage, Fetcher, HttpFetcher};
pub use page::is_page;
pub use result::{Outcome, ResultLedger, VisitRecord};
pub use visited::VisitedSet;
