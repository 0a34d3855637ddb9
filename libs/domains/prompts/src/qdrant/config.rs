use crate::error::{PromptError, PromptResult};

/// Default collection holding the prompt library.
pub const DEFAULT_COLLECTION: &str = "prompts";

/// Qdrant connection configuration.
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub collection: String,
}

impl QdrantConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            api_key: None,
            timeout_secs: 20,
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_collection(mut self, collection: String) -> Self {
        self.collection = collection;
        self
    }

    /// Read the connection settings from the environment. `QDRANT_URL` is
    /// required; the rest fall back to defaults.
    pub fn from_env() -> PromptResult<Self> {
        let url = std::env::var("QDRANT_URL")
            .map_err(|_| PromptError::Config("QDRANT_URL is not set".to_string()))?;

        let api_key = std::env::var("QDRANT_API_KEY").ok();

        let timeout_secs = std::env::var("QDRANT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);

        let collection = std::env::var("PROMPTS_COLLECTION")
            .unwrap_or_else(|_| DEFAULT_COLLECTION.to_string());

        Ok(Self {
            url,
            api_key,
            timeout_secs,
            collection,
        })
    }
}
