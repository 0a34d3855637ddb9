use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::error::{PromptError, PromptResult};

/// Fixed embedding model; its dimensionality is baked into the collection.
pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const EMBEDDING_DIMENSION: usize = 1536;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API configuration, shared by the embedding gateway and the raw
/// proxy routes.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn from_env() -> PromptResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| PromptError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            base_url,
            timeout_secs: 30,
        })
    }
}

/// OpenAI embeddings gateway.
pub struct OpenAiEmbeddings {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiEmbeddings {
    pub fn new(config: OpenAiConfig) -> PromptResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PromptError::Embedding(format!("Failed to build client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> PromptResult<Self> {
        Self::new(OpenAiConfig::from_env()?)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'static str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed(&self, text: &str) -> PromptResult<Vec<f32>> {
        // Fail fast before the network call when no credential is present.
        if self.config.api_key.is_empty() {
            return Err(PromptError::Config("OPENAI_API_KEY is not set".to_string()));
        }

        let request = EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input: text,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PromptError::EmbeddingUpstream { status, body });
        }

        let embedding_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| PromptError::Embedding(format!("Malformed response: {}", e)))?;

        embedding_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| PromptError::Embedding("No embedding returned".to_string()))
    }
}
