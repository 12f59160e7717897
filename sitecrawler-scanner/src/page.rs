use crate::canonical::CanonicalUrl;

/// Extensions that are always treated as pages.
const PAGE_EXTENSIONS: &[&str] = &[
    "html", "htm", "xhtml", "shtml", "php", "asp", "aspx", "jsp", "jspx", "cfm", "cgi",
];

/// Static assets that are never worth fetching when only pages are wanted.
/// Anything not listed here is assumed to be a page.
const ASSET_EXTENSIONS: &[&str] = &[
    // images
    "jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "ico", "tif", "tiff", "avif",
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "rtf", "txt",
    "csv", "epub",
    // archives and binaries
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "exe", "msi", "dmg", "iso", "apk",
    "bin",
    // stylesheets, scripts and data
    "css", "js", "mjs", "map", "json", "xml", "rss", "atom",
    // media
    "mp3", "mp4", "m4a", "avi", "mov", "wmv", "webm", "ogg", "wav", "flac",
    // fonts
    "woff", "woff2", "ttf", "otf", "eot",
];

/// Shape of the last path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Empty path, `/`, or a trailing slash.
    Directory,
    Extensionless,
    Page,
    Asset,
    /// An extension on neither list.
    Unknown,
}

impl PathKind {
    pub fn is_page(self) -> bool {
        !matches!(self, PathKind::Asset)
    }
}

pub fn classify_path(path: &str) -> PathKind {
    if path.is_empty() || path.ends_with('/') {
        return PathKind::Directory;
    }

    let segment = path.rsplit('/').next().unwrap_or(path);
    let extension = match segment.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => return PathKind::Extensionless,
    };

    if PAGE_EXTENSIONS.contains(&extension.as_str()) {
        PathKind::Page
    } else if ASSET_EXTENSIONS.contains(&extension.as_str()) {
        PathKind::Asset
    } else {
        PathKind::Unknown
    }
}

/// Whether `url` looks like an HTML page rather than a static asset.
pub fn is_page(url: &CanonicalUrl) -> bool {
    classify_path(url.as_url().path()).is_page()
}
