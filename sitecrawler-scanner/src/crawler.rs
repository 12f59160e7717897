use crate::canonical::{CanonicalUrl, Domain, HostMatch, UrlClass, UrlNormalizer};
use crate::error::{FetchError, Result};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::html;
use crate::page;
use crate::result::{DEFAULT_TITLE, Outcome, ResultLedger, VisitRecord};
use crate::visited::VisitedSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Something the engine did, reported as it happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    Fetching {
        url: String,
    },
    Visited {
        url: String,
        title: Option<String>,
        status_code: u16,
        outcome: Outcome,
    },
    ExternalLink {
        url: String,
    },
}

pub type ProgressCallback = Arc<dyn Fn(&CrawlEvent) + Send + Sync>;

/// Per-run settings. Fixed for the lifetime of a [`Crawler`].
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Follow internal links found on pages other than the seed.
    pub recursive: bool,
    /// Record external links instead of ignoring them. They are never fetched.
    pub collect_external: bool,
    /// Skip static assets by extension.
    pub pages_only: bool,
    pub host_match: HostMatch,
    /// Pause after every fetch attempt.
    pub delay: Duration,
    /// Per-request timeout handed to the fetcher.
    pub timeout: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            collect_external: false,
            pages_only: false,
            host_match: HostMatch::Exact,
            delay: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
        }
    }
}

struct WorkItem {
    url: CanonicalUrl,
    /// Link hops from the seed.
    depth: usize,
}

/// Serial, depth-first traversal of one domain.
///
/// Pages are visited in link-appearance order using an explicit stack, so
/// deep sites do not grow the call stack. Every fetch failure is recorded as
/// data; nothing that happens during traversal ends the crawl early.
pub struct Crawler<F = HttpFetcher> {
    fetcher: F,
    domain: Domain,
    config: CrawlConfig,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler<HttpFetcher> {
    pub fn new(domain: Domain) -> Result<Self> {
        Ok(Self::with_fetcher(domain, HttpFetcher::new()?))
    }
}

impl<F: Fetcher> Crawler<F> {
    pub fn with_fetcher(domain: Domain, fetcher: F) -> Self {
        Self {
            fetcher,
            domain,
            config: CrawlConfig::default(),
            progress_callback: None,
        }
    }

    pub fn with_config(mut self, config: CrawlConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.config.recursive = recursive;
        self
    }

    pub fn with_collect_external(mut self, collect_external: bool) -> Self {
        self.config.collect_external = collect_external;
        self
    }

    pub fn with_pages_only(mut self, pages_only: bool) -> Self {
        self.config.pages_only = pages_only;
        self
    }

    pub fn with_host_match(mut self, host_match: HostMatch) -> Self {
        self.config.host_match = host_match;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.config.delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawl from the domain's seed until no pending URLs remain.
    ///
    /// Each call starts from an empty visited set and ledger.
    pub async fn crawl(&self) -> ResultLedger {
        let normalizer = UrlNormalizer::new(self.domain.clone(), self.config.host_match);
        let visited = VisitedSet::new();
        let mut ledger = ResultLedger::new();

        info!(
            "Starting crawl of {} (recursive: {}, external: {}, pages only: {})",
            self.domain, self.config.recursive, self.config.collect_external, self.config.pages_only
        );

        let mut pending = vec![WorkItem {
            url: self.domain.seed().clone(),
            depth: 0,
        }];

        while let Some(item) = pending.pop() {
            if self.config.pages_only && !page::is_page(&item.url) {
                debug!("Skipping non-page {}", item.url);
                continue;
            }

            if !visited.mark_if_new(&item.url) {
                continue;
            }

            let hrefs = self.visit(&item.url, &mut ledger).await;

            if !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }

            let Some(hrefs) = hrefs else {
                continue;
            };

            let follow = self.config.recursive || item.depth == 0;
            let mut discovered = Vec::new();

            for href in hrefs {
                match normalizer.normalize(&href, item.url.as_url()) {
                    Ok((link, UrlClass::Internal)) => {
                        if !follow {
                            debug!("Not following {} (single-level crawl)", link);
                        } else if !visited.contains(&link) {
                            discovered.push(link);
                        }
                    }
                    Ok((link, _)) => {
                        if self.config.collect_external && ledger.add_external(&link) {
                            debug!("External link: {}", link);
                            self.emit(&CrawlEvent::ExternalLink {
                                url: link.as_str().to_string(),
                            });
                        }
                    }
                    Err(e) if e.class() == UrlClass::NonHttpScheme => {
                        debug!("Skipping {}: {}", href, e);
                    }
                    Err(_) => {}
                }
            }

            // reversed so the first link on the page is visited next
            pending.extend(discovered.into_iter().rev().map(|url| WorkItem {
                url,
                depth: item.depth + 1,
            }));
        }

        info!(
            "Crawl complete. Visited {} pages, {} external links",
            ledger.len(),
            ledger.external_count()
        );
        ledger
    }

    /// Fetch one page and record the attempt. Returns the page's hrefs when
    /// it was fetched successfully.
    async fn visit(&self, url: &CanonicalUrl, ledger: &mut ResultLedger) -> Option<Vec<String>> {
        self.emit(&CrawlEvent::Fetching {
            url: url.as_str().to_string(),
        });

        let (record, hrefs) = match self.fetcher.fetch(url.as_url(), self.config.timeout).await {
            Ok(fetched) => {
                if fetched.final_url != *url.as_url() {
                    debug!("{} redirected to {}", url, fetched.final_url);
                }
                let parsed = if fetched.is_html() {
                    html::parse_page(&fetched.body)
                } else {
                    debug!(
                        "Not parsing {} ({})",
                        url,
                        fetched.content_type.as_deref().unwrap_or("unknown type")
                    );
                    html::ParsedPage::default()
                };
                let title = parsed.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
                debug!("{} -> {} \"{}\"", url, fetched.status, title);
                (
                    VisitRecord::success(url, title, fetched.status),
                    Some(parsed.hrefs),
                )
            }
            Err(FetchError::Status(code)) => {
                warn!("HTTP {} for {}", code, url);
                (VisitRecord::http_error(url, code), None)
            }
            Err(e) => {
                warn!("Crawl error for {}: {}", url, e);
                (VisitRecord::transport_error(url), None)
            }
        };

        self.emit(&CrawlEvent::Visited {
            url: record.url().to_string(),
            title: record.title().map(str::to_string),
            status_code: record.status_code(),
            outcome: record.outcome(),
        });
        ledger.record(record);

        hrefs
    }

    fn emit(&self, event: &CrawlEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use url::Url;

    enum Reply {
        Page(&'static str),
        Status(u16),
        Refused,
    }

    /// In-memory site keyed by request URL.
    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, Reply>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeSite {
        fn page(mut self, url: &str, body: &'static str) -> Self {
            self.pages.insert(url.to_string(), Reply::Page(body));
            self
        }

        fn status(mut self, url: &str, code: u16) -> Self {
            self.pages.insert(url.to_string(), Reply::Status(code));
            self
        }

        fn refused(mut self, url: &str) -> Self {
            self.pages.insert(url.to_string(), Reply::Refused);
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Fetcher for &FakeSite {
        async fn fetch(
            &self,
            url: &Url,
            _timeout: Duration,
        ) -> std::result::Result<crate::fetcher::FetchedPage, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            match self.pages.get(url.as_str()) {
                Some(Reply::Page(body)) => Ok(crate::fetcher::FetchedPage {
                    status: 200,
                    final_url: url.clone(),
                    content_type: Some("text/html".to_string()),
                    body: body.to_string(),
                }),
                Some(Reply::Status(code)) => Err(FetchError::Status(*code)),
                Some(Reply::Refused) | None => Err(FetchError::Other("connection refused".into())),
            }
        }
    }

    fn crawler(site: &FakeSite) -> Crawler<&FakeSite> {
        Crawler::with_fetcher(Domain::parse("example.com").unwrap(), site)
            .with_delay(Duration::ZERO)
    }

    fn visited_urls(ledger: &ResultLedger) -> Vec<&str> {
        ledger.visits().iter().map(|v| v.url()).collect()
    }

    #[tokio::test]
    async fn test_cycle_visits_each_page_once() {
        let site = FakeSite::default()
            .page("https://example.com/", r#"<a href="/b">B</a>"#)
            .page(
                "https://example.com/b",
                r#"<a href="/">Home</a><a href="https://example.com/b/">Self</a>"#,
            );

        let ledger = crawler(&site).with_recursive(true).crawl().await;

        assert_eq!(
            visited_urls(&ledger),
            vec!["https://example.com", "https://example.com/b"]
        );
        assert_eq!(site.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_depth_first_in_link_order() {
        let site = FakeSite::default()
            .page("https://example.com/", r#"<a href="/a">A</a><a href="/b">B</a>"#)
            .page("https://example.com/a", r#"<a href="/a/deep">Deep</a>"#)
            .page("https://example.com/a/deep", "<p>leaf</p>")
            .page("https://example.com/b", "<p>leaf</p>");

        let ledger = crawler(&site).with_recursive(true).crawl().await;

        assert_eq!(
            visited_urls(&ledger),
            vec![
                "https://example.com",
                "https://example.com/a",
                "https://example.com/a/deep",
                "https://example.com/b",
            ]
        );
    }

    #[tokio::test]
    async fn test_single_level_stops_after_seed_links() {
        let site = FakeSite::default()
            .page("https://example.com/", r#"<a href="/a">A</a>"#)
            .page("https://example.com/a", r#"<a href="/a/deep">Deep</a>"#);

        let ledger = crawler(&site).crawl().await;

        assert_eq!(
            visited_urls(&ledger),
            vec!["https://example.com", "https://example.com/a"]
        );
    }

    #[tokio::test]
    async fn test_mixed_links_with_external_collection() {
        let site = FakeSite::default()
            .page(
                "https://example.com/",
                r#"<a href="/page1">P1</a>
                   <a href="mailto:a@b.com">Mail</a>
                   <a href="https://other.com">Other</a>"#,
            )
            .page("https://example.com/page1", "<title>Page 1</title>");

        let ledger = crawler(&site)
            .with_recursive(true)
            .with_collect_external(true)
            .crawl()
            .await;

        assert_eq!(
            visited_urls(&ledger),
            vec!["https://example.com", "https://example.com/page1"]
        );
        assert_eq!(ledger.external_links(), vec!["https://other.com"]);
        assert!(!site.requests().iter().any(|r| r.contains("other.com")));
    }

    #[tokio::test]
    async fn test_hostless_and_non_http_links_skipped() {
        let site = FakeSite::default().page(
            "https://example.com/",
            r#"<a href="http:///path">Broken</a>
               <a href="https:///">Broken root</a>
               <a href="javascript:void(0)">JS</a>
               <a href="tel:+15555550100">Call</a>"#,
        );

        let ledger = crawler(&site)
            .with_recursive(true)
            .with_collect_external(true)
            .crawl()
            .await;

        assert_eq!(visited_urls(&ledger), vec!["https://example.com"]);
        assert_eq!(ledger.external_count(), 0);
        assert_eq!(site.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_external_links_ignored_when_not_collecting() {
        let site =
            FakeSite::default().page("https://example.com/", r#"<a href="https://other.com">O</a>"#);

        let ledger = crawler(&site).with_recursive(true).crawl().await;

        assert_eq!(ledger.external_count(), 0);
    }

    #[tokio::test]
    async fn test_http_error_recorded_without_descent() {
        let site = FakeSite::default()
            .page("https://example.com/", r#"<a href="/missing">M</a>"#)
            .status("https://example.com/missing", 404);

        let ledger = crawler(&site).with_recursive(true).crawl().await;

        let missing = &ledger.visits()[1];
        assert_eq!(missing.url(), "https://example.com/missing");
        assert_eq!(missing.outcome(), Outcome::HttpError);
        assert_eq!(missing.status_code(), 404);
        assert_eq!(missing.title(), None);
    }

    #[tokio::test]
    async fn test_transport_error_recorded_and_crawl_continues() {
        let site = FakeSite::default()
            .page(
                "https://example.com/",
                r#"<a href="/down">Down</a><a href="/up">Up</a>"#,
            )
            .refused("https://example.com/down")
            .page("https://example.com/up", "<title>Up</title>");

        let ledger = crawler(&site).with_recursive(true).crawl().await;

        let down = &ledger.visits()[1];
        assert_eq!(down.outcome(), Outcome::TransportError);
        assert_eq!(down.status_code(), 0);
        assert_eq!(down.title(), None);

        let up = &ledger.visits()[2];
        assert_eq!(up.title(), Some("Up"));
    }

    #[tokio::test]
    async fn test_pages_only_skips_assets() {
        let site = FakeSite::default()
            .page(
                "https://example.com/",
                r#"<a href="/photo.jpg">J</a>
                   <a href="/paper.pdf">P</a>
                   <a href="/about">A</a>
                   <a href="/docs/">D</a>"#,
            )
            .page("https://example.com/about", "")
            .page("https://example.com/docs/", "");

        let ledger = crawler(&site)
            .with_recursive(true)
            .with_pages_only(true)
            .crawl()
            .await;

        assert_eq!(
            visited_urls(&ledger),
            vec![
                "https://example.com",
                "https://example.com/about",
                "https://example.com/docs",
            ]
        );
        assert!(!site.requests().iter().any(|r| r.ends_with(".jpg") || r.ends_with(".pdf")));
    }

    #[tokio::test]
    async fn test_default_title() {
        let site = FakeSite::default().page("https://example.com/", "<p>untitled</p>");

        let ledger = crawler(&site).crawl().await;

        assert_eq!(ledger.visits()[0].title(), Some(DEFAULT_TITLE));
    }

    #[tokio::test]
    async fn test_progress_events() {
        let site = FakeSite::default()
            .page("https://example.com/", r#"<a href="https://other.com/x">O</a>"#);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();

        crawler(&site)
            .with_collect_external(true)
            .with_progress_callback(Arc::new(move |event: &CrawlEvent| {
                sink.lock().unwrap().push(event.clone());
            }))
            .crawl()
            .await;

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                CrawlEvent::Fetching {
                    url: "https://example.com".to_string()
                },
                CrawlEvent::Visited {
                    url: "https://example.com".to_string(),
                    title: Some(DEFAULT_TITLE.to_string()),
                    status_code: 200,
                    outcome: Outcome::Success,
                },
                CrawlEvent::ExternalLink {
                    url: "https://other.com/x".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_each_crawl_starts_fresh() {
        let site = FakeSite::default().page("https://example.com/", "<title>Home</title>");
        let crawler = crawler(&site);

        let first = crawler.crawl().await;
        let second = crawler.crawl().await;

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(site.requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_after_each_fetch() {
        let site = FakeSite::default()
            .page("https://example.com/", r#"<a href="/a">A</a>"#)
            .status("https://example.com/a", 500);

        let start = tokio::time::Instant::now();
        Crawler::with_fetcher(Domain::parse("example.com").unwrap(), &site)
            .with_delay(Duration::from_secs(1))
            .crawl()
            .await;

        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
