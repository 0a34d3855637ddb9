mod client;
mod config;

pub use client::QdrantPromptStore;
pub use config::QdrantConfig;
