use crate::types::PageContent;
use crate::{truncate_chars, CONTENT_CHAR_LIMIT, NO_TITLE};
use scraper::{ElementRef, Html, Selector};
use tracing::instrument;

/// Elements removed from the body before text extraction. These carry no
/// prose a brochure could use.
const STRIPPED_TAGS: [&str; 4] = ["script", "style", "img", "input"];

/// Extracts the title and flattened body text from raw HTML.
///
/// The body text is collected from every text node under `<body>` except
/// those inside stripped elements, with segments separated by newlines and
/// surrounding whitespace trimmed. Pages without a `<body>` yield empty text.
/// A missing or empty `<title>` falls back to a fixed sentinel.
///
/// # Arguments
///
/// * `html` - The raw HTML document to extract from.
///
/// # Returns
///
/// A `PageContent` with the title and body, the body capped at
/// [`CONTENT_CHAR_LIMIT`] characters.
#[instrument(skip(html), fields(html_length = html.len()))]
pub fn extract_page(html: &str) -> PageContent {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_else(|| NO_TITLE.to_string());

    let mut parts = Vec::new();
    if let Ok(selector) = Selector::parse("body") {
        if let Some(body) = document.select(&selector).next() {
            collect_text(body, &mut parts);
        }
    }

    PageContent {
        title,
        body: truncate_chars(&parts.join("\n"), CONTENT_CHAR_LIMIT),
        fetched_at: chrono::Utc::now(),
    }
}

/// Extracts every non-empty anchor `href` from raw HTML.
///
/// Links are returned exactly as written in the document: relative URLs are
/// not resolved, duplicates are not removed, and order follows the document.
///
/// # Arguments
///
/// * `html` - The raw HTML document to extract links from.
///
/// # Returns
///
/// A vector of link targets; every entry is non-empty.
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extracts the document title, if present and non-empty.
fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>();
    let trimmed = title.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Walks an element's subtree collecting trimmed text segments, skipping
/// stripped elements entirely.
fn collect_text(element: ElementRef<'_>, parts: &mut Vec<String>) {
    if STRIPPED_TAGS.contains(&element.value().name()) {
        return;
    }

    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed.to_string());
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            collect_text(child_element, parts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that scripts, styles, images and inputs are stripped from the
    /// extracted text.
    #[test]
    fn test_strips_non_content_elements() {
        let html = r#"
            <!DOCTYPE html>
            <html>
                <head><title>Acme Corp</title></head>
                <body>
                    <h1>Welcome to Acme</h1>
                    <script>console.log("tracking");</script>
                    <style>.hidden { display: none; }</style>
                    <img src="logo.png" alt="logo">
                    <input type="text" value="search">
                    <p>We make everything.</p>
                </body>
            </html>
        "#;

        let page = extract_page(html);

        assert_eq!(page.title, "Acme Corp");
        assert!(page.body.contains("Welcome to Acme"));
        assert!(page.body.contains("We make everything."));
        assert!(!page.body.contains("tracking"));
        assert!(!page.body.contains("display: none"));
    }

    /// Tests that text segments are newline-separated and trimmed.
    #[test]
    fn test_text_is_newline_separated() {
        let html = r#"
            <html><head><title>T</title></head>
            <body><p>  first  </p><p>second</p></body></html>
        "#;

        let page = extract_page(html);

        assert_eq!(page.body, "first\nsecond");
    }

    /// Tests the title sentinel when no title element exists.
    #[test]
    fn test_missing_title_falls_back() {
        let html = "<html><body><p>Content</p></body></html>";
        let page = extract_page(html);

        assert_eq!(page.title, crate::NO_TITLE);
        assert_eq!(page.body, "Content");
    }

    /// Tests that a page without a body yields empty text and still
    /// produces a usable result.
    #[test]
    fn test_no_body_yields_empty_text() {
        let html = "<head><title></title></head>";
        let page = extract_page(html);

        assert_eq!(page.title, crate::NO_TITLE);
        assert_eq!(page.body, "");
        assert_eq!(page.prompt_text(), format!("{}\n\n", crate::NO_TITLE));
    }

    /// Tests that link extraction keeps relative URLs and drops empty or
    /// missing targets.
    #[test]
    fn test_link_extraction() {
        let html = r#"
            <html><body>
                <a href="https://example.com/about">About</a>
                <a href="/careers">Careers</a>
                <a href="">Empty</a>
                <a>No target</a>
                <a href="/careers">Careers again</a>
            </body></html>
        "#;

        let links = extract_links(html);

        assert_eq!(
            links,
            vec!["https://example.com/about", "/careers", "/careers"]
        );
        assert!(links.iter().all(|link| !link.is_empty()));
    }
}
