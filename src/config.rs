use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// The `AppConfig` struct holds the configuration settings for the brochure
/// generator. It is constructed once at startup and passed by reference into
/// every component that performs HTTP or completion calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// The timeout duration for HTTP requests.
    pub timeout: Duration,
    /// The user agent string to be used when fetching websites. Some sites
    /// reject unidentified clients, so this defaults to a browser user agent.
    pub user_agent: String,
    /// The configuration settings for the completion endpoint.
    pub llm: LlmConfig,
}

/// The `LlmConfig` struct holds the configuration settings for the
/// OpenAI-compatible completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// The base URL of the completion API, without a trailing slash.
    pub api_base: String,
    /// The API key sent as a bearer token with every completion request.
    pub api_key: String,
    /// The model used for link selection (a cheaper, faster tier).
    pub link_model: String,
    /// The model used for brochure composition (a stronger tier).
    pub brochure_model: String,
}

impl Default for AppConfig {
    /// Provides default values for the `AppConfig` struct.
    ///
    /// # Returns
    ///
    /// An `AppConfig` instance with default settings and an empty API key.
    fn default() -> Self {
        Self {
            timeout: crate::DEFAULT_TIMEOUT,
            user_agent: String::from(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/117.0.0.0 Safari/537.36",
            ),
            llm: LlmConfig {
                api_base: String::from("https://api.openai.com/v1"),
                api_key: String::new(),
                link_model: String::from("gpt-5-nano"),
                brochure_model: String::from("gpt-4.1-mini"),
            },
        }
    }
}

impl AppConfig {
    /// Loads the configuration from the process environment.
    ///
    /// Reads `OPENAI_API_KEY` for the credential, with optional overrides via
    /// `OPENAI_API_BASE`, `PROSPECTUS_LINK_MODEL` and `PROSPECTUS_MODEL`. The
    /// key is validated only cosmetically: an unexpected format produces a
    /// warning but never blocks execution.
    ///
    /// # Returns
    ///
    /// An `AppConfig` instance populated from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if key.starts_with("sk-proj-") && key.len() > 10 => {
                config.llm.api_key = key;
            }
            Ok(key) => {
                warn!("API key does not look like an OpenAI project key; requests may fail");
                config.llm.api_key = key;
            }
            Err(_) => {
                warn!("OPENAI_API_KEY is not set; completion requests will fail");
            }
        }

        if let Ok(base) = std::env::var("OPENAI_API_BASE") {
            config.llm.api_base = base.trim_end_matches('/').to_string();
        }
        if let Ok(model) = std::env::var("PROSPECTUS_LINK_MODEL") {
            config.llm.link_model = model;
        }
        if let Ok(model) = std::env::var("PROSPECTUS_MODEL") {
            config.llm.brochure_model = model;
        }

        config
    }
}
