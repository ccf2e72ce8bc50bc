use crate::display::{BrochureSink, ConsoleSink};
use crate::fetch::WebsiteFetcher;
use crate::llm::CompletionClient;
use crate::types::RelevanceSet;
use crate::{prompt, AppConfig, Result};
use futures::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, warn};

/// The `BrochureGenerator` struct runs the whole pipeline: it fetches the
/// landing page, asks the model which links matter, aggregates the selected
/// pages into one document and composes the brochure from it.
pub struct BrochureGenerator {
    /// The application configuration.
    config: AppConfig,
    /// The fetcher used for every page retrieval.
    fetcher: WebsiteFetcher,
    /// The completion-endpoint client used for both model calls.
    llm: CompletionClient,
    /// The progress bar used to display progress information.
    progress: MultiProgress,
}

impl BrochureGenerator {
    /// Creates a new `BrochureGenerator` with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The application configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `BrochureGenerator` instance, or an error
    /// if the HTTP client could not be created.
    pub fn new(config: AppConfig) -> Result<Self> {
        let fetcher = WebsiteFetcher::new(&config)?;
        let llm = CompletionClient::new(config.llm.clone());

        Ok(Self {
            config,
            fetcher,
            llm,
            progress: MultiProgress::new(),
        })
    }

    /// Asks the model which of the page's links belong in a brochure.
    ///
    /// All links found on the page are embedded in the prompt; the model
    /// answers in JSON structured-output mode on the cheaper model tier. An
    /// empty selection is valid. A response that does not match the
    /// `{links: [{type, url}]}` schema fails with a selection error; there
    /// is no retry and no fallback to an empty set.
    ///
    /// # Arguments
    ///
    /// * `url` - The website URL to analyze.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `RelevanceSet` the model returned.
    pub async fn select_relevant_links(&self, url: &str) -> Result<RelevanceSet> {
        let links = self.fetcher.fetch_links(url).await?;
        let user_prompt = prompt::links_user_prompt(url, &links);

        let raw = self
            .llm
            .complete_json(
                prompt::LINK_SYSTEM_PROMPT,
                &user_prompt,
                &self.config.llm.link_model,
            )
            .await?;

        let selection: RelevanceSet = serde_json::from_str(&raw)?;
        debug!(count = selection.links.len(), "relevant links selected");

        Ok(selection)
    }

    /// Aggregates the landing page and every model-selected page into one
    /// labeled document.
    ///
    /// The landing page always comes first, then one `### Link:` section
    /// per selected link in the order the model returned them. Pages are
    /// fetched strictly in sequence. URLs are not deduplicated: a URL the
    /// model returns twice is fetched and appended twice.
    ///
    /// # Arguments
    ///
    /// * `url` - The company website URL.
    ///
    /// # Returns
    ///
    /// A `Result` containing the aggregated document.
    pub async fn build_document(&self, url: &str) -> Result<String> {
        let spinner = self.progress.add(ProgressBar::new_spinner());
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );

        spinner.set_message(format!("Fetching landing page {url}..."));
        let landing = self.fetcher.fetch_content(url).await?;
        let mut document = format!(
            "## Landing Page:\n\n{}\n## Relevant Links:\n",
            landing.prompt_text()
        );

        spinner.set_message("Selecting relevant links...");
        let selection = self.select_relevant_links(url).await?;

        for link in &selection.links {
            spinner.set_message(format!("Fetching {}", link.url));
            let page = self.fetcher.fetch_content(&link.url).await?;
            document.push_str(&format!("\n\n### Link: {}\n", link.kind));
            document.push_str(&page.prompt_text());
        }

        spinner.finish_with_message(format!(
            "Aggregated landing page and {} related pages",
            selection.links.len()
        ));

        Ok(document)
    }

    /// Builds the final brochure user prompt for a company.
    ///
    /// Shared by the streaming and non-streaming entry points so both send
    /// an identical prompt.
    pub async fn brochure_prompt(&self, company_name: &str, url: &str) -> Result<String> {
        let document = self.build_document(url).await?;
        Ok(prompt::brochure_user_prompt(company_name, url, &document))
    }

    /// Composes the brochure in one non-streaming request.
    ///
    /// # Arguments
    ///
    /// * `company_name` - The name of the company.
    /// * `url` - The company's website URL.
    ///
    /// # Returns
    ///
    /// A `Result` containing the complete brochure text.
    pub async fn compose(&self, company_name: &str, url: &str) -> Result<String> {
        let user_prompt = self.brochure_prompt(company_name, url).await?;

        self.llm
            .complete(
                prompt::BROCHURE_SYSTEM_PROMPT,
                &user_prompt,
                &self.config.llm.brochure_model,
            )
            .await
    }

    /// Composes the brochure with token-incremental streaming.
    ///
    /// Each arriving fragment is appended to the accumulator and forwarded
    /// to the supplied sink. Sink readiness is checked once before the
    /// loop; if the sink fails mid-stream, output falls back to the plain
    /// console for the remaining fragments and the accumulated text is
    /// unaffected. After the stream completes, the full text is optionally
    /// written to `save_to` (overwriting any existing file), then returned.
    ///
    /// # Arguments
    ///
    /// * `company_name` - The name of the company.
    /// * `url` - The company's website URL.
    /// * `sink` - An optional display sink; `None` streams to the console.
    /// * `save_to` - An optional file path for the finished brochure.
    ///
    /// # Returns
    ///
    /// A `Result` containing the complete accumulated brochure text.
    pub async fn compose_streaming(
        &self,
        company_name: &str,
        url: &str,
        mut sink: Option<&mut dyn BrochureSink>,
        save_to: Option<&Path>,
    ) -> Result<String> {
        let user_prompt = self.brochure_prompt(company_name, url).await?;

        let mut stream = self
            .llm
            .complete_stream(
                prompt::BROCHURE_SYSTEM_PROMPT,
                &user_prompt,
                &self.config.llm.brochure_model,
            )
            .await?;

        if matches!(sink.as_deref(), Some(candidate) if !candidate.is_ready()) {
            warn!("display sink is not ready; using console output");
            sink = None;
        }

        let mut console = ConsoleSink;
        let mut response = String::new();

        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            response.push_str(&fragment);

            let forwarded = match sink.as_deref_mut() {
                Some(active) => active.forward(&fragment).is_ok(),
                None => {
                    let _ = console.forward(&fragment);
                    true
                }
            };

            if !forwarded {
                warn!("display sink failed; falling back to console output");
                sink = None;
                let _ = console.forward(&fragment);
            }
        }

        if let Some(path) = save_to {
            tokio::fs::write(path, &response).await?;
            println!("\n\nBrochure saved to {}", path.display());
        }

        Ok(response)
    }
}
