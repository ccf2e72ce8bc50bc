use crate::{truncate_chars, PROMPT_CHAR_LIMIT};

/// System prompt for the link-selection call. The model sees every link
/// found on the landing page and answers with the structured
/// `{links: [{type, url}]}` shape.
pub const LINK_SYSTEM_PROMPT: &str = r#"
You are provided with a list of links found on a webpage.
You are able to decide which of the links would be most relevant to include in a brochure about the company,
such as links to an About page, or a Company page, or Careers/Jobs pages.
You should respond in JSON as in this example:

{
    "links": [
        {"type": "about page", "url": "https://full.url/goes/here/about"},
        {"type": "careers page", "url": "https://another.full.url/careers"}
    ]
}
"#;

/// System prompt for the brochure composition call.
pub const BROCHURE_SYSTEM_PROMPT: &str = "
You are an assistant that analyzes the contents of several relevant pages from a company website
and creates a short, humorous, entertaining, witty brochure about the company for prospective customers, investors and recruits.
Respond in markdown without code blocks.
Include details of company culture, customers and careers/jobs if you have the information.
";

/// Builds the user prompt for the link-selection call.
///
/// Every link found on the page is embedded as-is; relative links are
/// included and left for the model to judge.
///
/// # Arguments
///
/// * `url` - The website the links were found on.
/// * `links` - The link targets, in document order.
///
/// # Returns
///
/// The formatted user prompt.
pub fn links_user_prompt(url: &str, links: &[String]) -> String {
    let mut prompt = format!(
        "\nHere is the list of links on the website {url} -\n\
         Please decide which of these are relevant web links for a brochure about the company,\n\
         respond with the full https URL in JSON format.\n\
         Do not include Terms of Service, Privacy, email links.\n\n\
         Links (some might be relative links):\n\n"
    );
    prompt.push_str(&links.join("\n"));
    prompt
}

/// Builds the user prompt for the brochure composition call.
///
/// The aggregated document is appended to an instructional preamble and the
/// whole prompt is truncated once, after full assembly, to
/// [`PROMPT_CHAR_LIMIT`] characters. The cut is a plain prefix slice.
///
/// # Arguments
///
/// * `company_name` - The name of the company.
/// * `url` - The company's website URL.
/// * `document` - The aggregated landing-page-plus-relevant-links document.
///
/// # Returns
///
/// The formatted, capped user prompt.
pub fn brochure_user_prompt(company_name: &str, url: &str, document: &str) -> String {
    let prompt = format!(
        "\nYou are looking at a company called: {company_name}\n\
         Here are the contents of its landing page and other relevant pages ({url});\n\
         use this information to build a short brochure of the company in markdown without code blocks.\n\n\n\
         {document}"
    );
    truncate_chars(&prompt, PROMPT_CHAR_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that the link prompt embeds the URL and every link.
    #[test]
    fn test_links_user_prompt() {
        let links = vec![
            "https://example.com/about".to_string(),
            "/careers".to_string(),
        ];

        let prompt = links_user_prompt("https://example.com", &links);

        assert!(prompt.contains("https://example.com -"));
        assert!(prompt.contains("https://example.com/about\n/careers"));
        assert!(prompt.contains("Do not include Terms of Service"));
    }

    /// Tests that the brochure prompt contains company name, URL and the
    /// document.
    #[test]
    fn test_brochure_user_prompt() {
        let prompt = brochure_user_prompt("Acme", "https://acme.com", "## Landing Page:\n\ntext");

        assert!(prompt.contains("a company called: Acme"));
        assert!(prompt.contains("https://acme.com"));
        assert!(prompt.contains("## Landing Page:"));
    }

    /// Tests that truncation happens exactly once, over the fully assembled
    /// prompt, and never exceeds the cap.
    #[test]
    fn test_brochure_prompt_cap() {
        let document = "x".repeat(20_000);
        let prompt = brochure_user_prompt("Acme", "https://acme.com", &document);

        assert_eq!(prompt.chars().count(), PROMPT_CHAR_LIMIT);
        assert!(prompt.starts_with("\nYou are looking at a company called: Acme"));
    }
}
