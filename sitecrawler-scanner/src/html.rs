use scraper::{Html, Selector};
use std::sync::LazyLock;

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Title and raw anchor targets of one HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    pub title: Option<String>,
    pub hrefs: Vec<String>,
}

pub fn parse_page(body: &str) -> ParsedPage {
    let document = Html::parse_document(body);
    ParsedPage {
        title: title_of(&document),
        hrefs: hrefs_of(&document),
    }
}

/// Text of the first `<title>`, trimmed. Blank titles count as absent.
pub fn extract_title(body: &str) -> Option<String> {
    title_of(&Html::parse_document(body))
}

/// `href` of every anchor, unresolved, in document order.
pub fn extract_hrefs(body: &str) -> Vec<String> {
    hrefs_of(&Html::parse_document(body))
}

fn title_of(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

fn hrefs_of(document: &Html) -> Vec<String> {
    document
        .select(&LINK_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>  Test Page \n</title></head></html>";
        assert_eq!(extract_title(html), Some("Test Page".to_string()));
    }

    #[test]
    fn test_missing_or_blank_title() {
        assert_eq!(extract_title("<html><body>hi</body></html>"), None);
        assert_eq!(extract_title("<title>   </title>"), None);
    }

    #[test]
    fn test_hrefs_in_document_order() {
        let html = r#"
            <a href="/page1">One</a>
            <a name="anchor">No href</a>
            <a href="mailto:a@b.com">Mail</a>
            <a href="">Empty</a>
            <a href="https://other.com">Other</a>
        "#;
        assert_eq!(
            extract_hrefs(html),
            vec!["/page1", "mailto:a@b.com", "", "https://other.com"]
        );
    }

    #[test]
    fn test_parse_page() {
        let html = r#"<html><head><title>Home</title></head>
            <body><a href="/a">A</a><a href="/b">B</a></body></html>"#;
        let page = parse_page(html);
        assert_eq!(page.title.as_deref(), Some("Home"));
        assert_eq!(page.hrefs, vec!["/a", "/b"]);
    }
}
