use crate::canonical::CanonicalUrl;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Title recorded for a successful page that has no usable `<title>`.
pub const DEFAULT_TITLE: &str = "No title";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    HttpError,
    TransportError,
}

/// One fetch attempt. Created once per canonical URL and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    url: String,
    title: Option<String>,
    status_code: u16,
    outcome: Outcome,
}

impl VisitRecord {
    pub fn success(url: &CanonicalUrl, title: String, status_code: u16) -> Self {
        Self {
            url: url.as_str().to_string(),
            title: Some(title),
            status_code,
            outcome: Outcome::Success,
        }
    }

    pub fn http_error(url: &CanonicalUrl, status_code: u16) -> Self {
        Self {
            url: url.as_str().to_string(),
            title: None,
            status_code,
            outcome: Outcome::HttpError,
        }
    }

    pub fn transport_error(url: &CanonicalUrl) -> Self {
        Self {
            url: url.as_str().to_string(),
            title: None,
            status_code: 0,
            outcome: Outcome::TransportError,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// Everything a crawl produced: visits in fetch order plus the distinct
/// external links seen along the way.
#[derive(Debug, Clone, Default)]
pub struct ResultLedger {
    visits: Vec<VisitRecord>,
    external: HashSet<String>,
}

impl ResultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, visit: VisitRecord) {
        self.visits.push(visit);
    }

    /// Returns true if the link had not been seen before.
    pub fn add_external(&mut self, url: &CanonicalUrl) -> bool {
        self.external.insert(url.as_str().to_string())
    }

    pub fn visits(&self) -> &[VisitRecord] {
        &self.visits
    }

    /// External links in lexicographic order.
    pub fn external_links(&self) -> Vec<String> {
        let mut links: Vec<String> = self.external.iter().cloned().collect();
        links.sort();
        links
    }

    pub fn external_count(&self) -> usize {
        self.external.len()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.visits.iter().filter(|v| v.outcome == outcome).count()
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }
}
