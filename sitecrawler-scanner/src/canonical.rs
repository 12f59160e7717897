use crate::error::{NormalizeError, Result, ScanError};
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

/// How a discovered address relates to the crawl target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlClass {
    Internal,
    External,
    Invalid,
    NonHttpScheme,
}

impl NormalizeError {
    pub fn class(&self) -> UrlClass {
        match self {
            NormalizeError::UnsupportedScheme(_) => UrlClass::NonHttpScheme,
            NormalizeError::EmptyInput | NormalizeError::MalformedUrl(_) => UrlClass::Invalid,
        }
    }
}

/// Host membership policy for Internal classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostMatch {
    /// Authority must equal the target authority. Subdomains are external.
    #[default]
    Exact,
    /// Target authority only has to appear inside the URL authority.
    Contains,
}

/// A normalized http(s) address used as the deduplication key.
///
/// The key is `scheme://authority/path` with query, fragment and one trailing
/// slash removed; the root path contributes nothing to the key. The resolved
/// [`Url`] keeps the path as written so relative links on directory pages
/// still resolve correctly. Equality and hashing only look at the key.
#[derive(Debug, Clone)]
pub struct CanonicalUrl {
    key: String,
    authority: String,
    url: Url,
}

impl CanonicalUrl {
    /// Canonicalize an absolute address.
    pub fn parse(raw: &str) -> std::result::Result<Self, NormalizeError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(NormalizeError::EmptyInput);
        }
        reject_empty_authority(raw)?;
        let url = Url::parse(raw).map_err(|e| NormalizeError::MalformedUrl(format!("{raw}: {e}")))?;
        Self::from_url(url)
    }

    /// Resolve `raw` against `base` and canonicalize the result.
    pub fn resolve(raw: &str, base: &Url) -> std::result::Result<Self, NormalizeError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(NormalizeError::EmptyInput);
        }
        reject_empty_authority(raw)?;
        let resolved = base
            .join(raw)
            .map_err(|e| NormalizeError::MalformedUrl(format!("{raw}: {e}")))?;
        Self::from_url(resolved)
    }

    pub fn from_url(mut url: Url) -> std::result::Result<Self, NormalizeError> {
        let scheme = url.scheme().to_ascii_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(NormalizeError::UnsupportedScheme(scheme));
        }

        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
            _ => return Err(NormalizeError::MalformedUrl(url.to_string())),
        };

        url.set_query(None);
        url.set_fragment(None);

        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host,
        };

        let path = url.path();
        let path = if path == "/" {
            ""
        } else {
            path.strip_suffix('/').unwrap_or(path)
        };

        Ok(Self {
            key: format!("{scheme}://{authority}{path}"),
            authority,
            url,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Lower-cased host plus any non-default port.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// The resolved address to fetch and to resolve relative links against.
    pub fn as_url(&self) -> &Url {
        &self.url
    }
}

/// `http:///path` has no authority. WHATWG parsing skips the extra slashes
/// and would take `path` as the host.
fn reject_empty_authority(raw: &str) -> std::result::Result<(), NormalizeError> {
    let Some((scheme, rest)) = raw.split_once(':') else {
        return Ok(());
    };
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return Ok(());
    }
    let slashes = rest.chars().take_while(|c| matches!(c, '/' | '\\')).count();
    if slashes > 2 {
        return Err(NormalizeError::MalformedUrl(format!("{raw}: empty host")));
    }
    Ok(())
}

impl PartialEq for CanonicalUrl {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CanonicalUrl {}

impl Hash for CanonicalUrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl Serialize for CanonicalUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key)
    }
}

/// The crawl target: an authority plus the seed address derived from it.
#[derive(Debug, Clone)]
pub struct Domain {
    seed: CanonicalUrl,
}

impl Domain {
    /// Accepts a bare authority (`www.example.com`, `localhost:8080`), which is
    /// seeded over https, or an absolute http(s) URL.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ScanError::InvalidDomain("domain must not be empty".to_string()));
        }

        let candidate = if input.contains("://") {
            input.to_string()
        } else {
            // `host:port` is the only bare form with a colon; `mailto:` and
            // friends must not be read as userinfo or a host
            if !input.starts_with('[')
                && let Some(authority) = input.split('/').next()
                && let Some((_, rest)) = authority.split_once(':')
                && !rest.starts_with(|c: char| c.is_ascii_digit())
            {
                return Err(ScanError::InvalidDomain(format!(
                    "{}: not an http(s) address",
                    input
                )));
            }
            format!("https://{}", input)
        };

        let seed = CanonicalUrl::parse(&candidate)
            .map_err(|e| ScanError::InvalidDomain(format!("{}: {}", input, e)))?;

        let url = seed.as_url();
        if !url.username().is_empty() || url.password().is_some() {
            return Err(ScanError::InvalidDomain(format!(
                "{}: credentials are not allowed in the domain",
                input
            )));
        }

        Ok(Self { seed })
    }

    pub fn authority(&self) -> &str {
        self.seed.authority()
    }

    pub fn seed(&self) -> &CanonicalUrl {
        &self.seed
    }

    pub fn contains(&self, url: &CanonicalUrl, host_match: HostMatch) -> bool {
        match host_match {
            HostMatch::Exact => url.authority() == self.authority(),
            HostMatch::Contains => url.authority().contains(self.authority()),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.authority())
    }
}

/// Canonicalizes discovered hrefs and classifies them against a [`Domain`].
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    domain: Domain,
    host_match: HostMatch,
}

impl UrlNormalizer {
    pub fn new(domain: Domain, host_match: HostMatch) -> Self {
        Self { domain, host_match }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn normalize(
        &self,
        raw: &str,
        base: &Url,
    ) -> std::result::Result<(CanonicalUrl, UrlClass), NormalizeError> {
        let url = CanonicalUrl::resolve(raw, base)?;
        let class = self.classify(&url);
        Ok((url, class))
    }

    pub fn classify(&self, url: &CanonicalUrl) -> UrlClass {
        if self.domain.contains(url, self.host_match) {
            UrlClass::Internal
        } else {
            UrlClass::External
        }
    }
}
