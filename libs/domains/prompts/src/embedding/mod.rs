mod openai;
mod provider;

pub use openai::{OpenAiConfig, OpenAiEmbeddings, EMBEDDING_DIMENSION, EMBEDDING_MODEL};
pub use provider::EmbeddingProvider;

#[cfg(test)]
pub(crate) use provider::MockEmbeddingProvider;
