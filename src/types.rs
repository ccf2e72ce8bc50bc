use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The `PageContent` struct holds the extracted content of a single fetched
/// page: the page title (or a sentinel when absent) and the flattened body
/// text. Instances are ephemeral and never cached across calls.
#[derive(Debug, Clone, Serialize)]
pub struct PageContent {
    /// The page title, or [`crate::NO_TITLE`] when the page has none.
    pub title: String,
    /// The flattened body text, newline-separated and trimmed.
    pub body: String,
    /// When the page was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl PageContent {
    /// Renders this page the way it is embedded in a prompt: title, a blank
    /// line, then the body, capped at [`crate::CONTENT_CHAR_LIMIT`]
    /// characters in total. The cap is a plain prefix slice and may cut
    /// mid-word.
    pub fn prompt_text(&self) -> String {
        crate::truncate_chars(
            &format!("{}\n\n{}", self.title, self.body),
            crate::CONTENT_CHAR_LIMIT,
        )
    }
}

/// One entry in the model's relevance judgment: a free-form label chosen by
/// the model (e.g. "about page") and a fully-qualified URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRef {
    /// The label the model assigned to the link.
    #[serde(rename = "type")]
    pub kind: String,
    /// The full URL of the linked page.
    pub url: String,
}

/// The set of links the model judged relevant for the brochure. May be
/// empty; an empty set is a valid selection, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceSet {
    /// The selected links, in the order the model returned them.
    pub links: Vec<LinkRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that prompt rendering caps title plus body at the page limit.
    #[test]
    fn test_prompt_text_cap() {
        let page = PageContent {
            title: "Example Domain".to_string(),
            body: "x".repeat(5_000),
            fetched_at: Utc::now(),
        };

        let text = page.prompt_text();
        assert_eq!(text.chars().count(), crate::CONTENT_CHAR_LIMIT);
        assert!(text.starts_with("Example Domain\n\n"));
    }

    /// Tests that the selection schema accepts the model's field names.
    #[test]
    fn test_relevance_set_schema() {
        let json = r#"{"links": [{"type": "about page", "url": "https://example.com/about"}]}"#;
        let set: RelevanceSet = serde_json::from_str(json).unwrap();

        assert_eq!(set.links.len(), 1);
        assert_eq!(set.links[0].kind, "about page");
        assert_eq!(set.links[0].url, "https://example.com/about");
    }
}
