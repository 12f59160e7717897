use thiserror::Error;

/// Fatal errors. Only configuration problems end up here; nothing inside the
/// traversal loop is allowed to abort a crawl.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// Why a discovered href could not be turned into a crawlable address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("empty link")]
    EmptyInput,

    #[error("malformed URL: {0}")]
    MalformedUrl(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),
}

/// Failure reported by a [`Fetcher`](crate::fetcher::Fetcher).
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Other error: {0}")]
    Other(String),
}
