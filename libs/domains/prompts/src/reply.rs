//! Parsing of structured (JSON) chat-model replies.

use serde_json::Value;

use crate::error::{PromptError, PromptResult};

/// Parses a model reply that should contain a JSON document, tolerating the
/// markdown code fences chat models like to wrap JSON in.
///
/// Parse failures surface as [`PromptError::InvalidReply`], distinct from
/// upstream transport errors.
pub fn parse_structured_reply(reply: &str) -> PromptResult<Value> {
    let trimmed = reply.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(inner)
        .map_err(|e| PromptError::InvalidReply(format!("malformed JSON reply: {}", e)))
}
