use crate::types::PageContent;
use crate::{scrape, AppConfig, BrochureError, Result};
use reqwest::Client;
use tracing::debug;

/// The `WebsiteFetcher` struct retrieves pages from the company website.
/// It uses the `reqwest` library for HTTP requests and delegates all parsing
/// to the `scrape` module.
pub struct WebsiteFetcher {
    /// The HTTP client used for making requests.
    client: Client,
}

impl WebsiteFetcher {
    /// Creates a new `WebsiteFetcher` with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The application configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `WebsiteFetcher` instance, or an error if
    /// the client could not be created.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(BrochureError::RequestError)?;

        Ok(Self { client })
    }

    /// Fetches a page and extracts its title and body text.
    ///
    /// One GET request per call. The response status is not inspected: the
    /// body is parsed regardless, and network failures propagate to the
    /// caller.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL of the page to fetch.
    ///
    /// # Returns
    ///
    /// A `Result` containing the extracted `PageContent`.
    pub async fn fetch_content(&self, url: &str) -> Result<PageContent> {
        let html = self.get(url).await?;
        let page = scrape::extract_page(&html);

        debug!(
            url,
            title = %page.title,
            fetched_at = %page.fetched_at,
            chars = page.body.chars().count(),
            "page content extracted"
        );

        Ok(page)
    }

    /// Fetches a page and extracts every non-empty anchor href.
    ///
    /// This issues a separate GET from [`Self::fetch_content`], even against
    /// the same URL; the two calls share nothing.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL of the page to fetch links from.
    ///
    /// # Returns
    ///
    /// A `Result` containing the link targets as found in the document.
    pub async fn fetch_links(&self, url: &str) -> Result<Vec<String>> {
        let html = self.get(url).await?;
        let links = scrape::extract_links(&html);

        debug!(url, count = links.len(), "links extracted");

        Ok(links)
    }

    /// Issues one GET request and returns the response body as text.
    async fn get(&self, url: &str) -> Result<String> {
        debug!("Fetching: {}", url);

        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await?;

        debug!("Response status: {}", response.status());

        Ok(response.text().await?)
    }
}
