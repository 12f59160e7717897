use crate::canonical::CanonicalUrl;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Canonical URLs already handed to the fetcher during one crawl.
///
/// Grows monotonically. `mark_if_new` is the only way in and does the
/// membership test and the insert under one lock, so a URL is claimed by
/// exactly one caller even if the set is shared between workers.
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true iff `url` was not present before this call.
    pub fn mark_if_new(&self, url: &CanonicalUrl) -> bool {
        self.lock().insert(url.as_str().to_string())
    }

    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.lock().contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // insert-only; a poisoned set is still valid
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
