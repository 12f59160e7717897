use crate::error::{FetchError, Result};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; sitecrawler/",
    env!("CARGO_PKG_VERSION"),
    "; +https://github.com/trapdoorsec/sitecrawler)"
);

/// A successful (non 4xx/5xx) response.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    /// Address after redirects.
    pub final_url: Url,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchedPage {
    /// Responses without a content type are given the benefit of the doubt.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_ref()
            .map(|ct| ct.to_ascii_lowercase().contains("html"))
            .unwrap_or(true)
    }
}

/// Retrieves documents for the crawler.
///
/// Implementations follow redirects, return `FetchError::Status` for 4xx and
/// 5xx responses and any other variant for failures below HTTP.
pub trait Fetcher {
    fn fetch(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> impl Future<Output = std::result::Result<FetchedPage, FetchError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> std::result::Result<FetchedPage, FetchError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;

        Ok(FetchedPage {
            status: status.as_u16(),
            final_url,
            content_type,
            body,
        })
    }
}
