//! Configuration for the Promptea API

use core_config::{ConfigError, FromEnv, server::ServerConfig};
use domain_prompts::{OpenAiConfig, QdrantConfig};

pub use core_config::Environment;

/// Env vars the server cannot start without.
const REQUIRED_ENV_VARS: &[&str] = &["QDRANT_URL", "OPENAI_API_KEY"];

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173";

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub environment: Environment,
    pub allowed_origins: Vec<String>,
    pub qdrant: QdrantConfig,
    pub openai: OpenAiConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        // Enumerate every missing required key up front so a fresh deploy
        // fails once with the full list instead of one var at a time.
        let missing: Vec<String> = REQUIRED_ENV_VARS
            .iter()
            .filter(|key| std::env::var(key).map_or(true, |v| v.trim().is_empty()))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingEnvVars(missing).into());
        }

        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let qdrant = QdrantConfig::from_env()?;
        let openai = OpenAiConfig::from_env()?;

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            server,
            environment,
            allowed_origins,
            qdrant,
            openai,
        })
    }
}
