use std::borrow::Cow;

use async_trait::async_trait;
use serde_json::Value;

use super::api::{CompletionOptions, LlmApiClient};
use super::{prompts, Summarizer};
use crate::config::LlmConfig;
use crate::error::{MtextsError, Result};
use crate::models::{SummaryResult, MISSING_SUMMARY};

pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated due to length]";

/// Summarizer backed by an OpenAI-compatible chat completion endpoint.
pub struct LlmSummarizer {
    client: LlmApiClient,
    options: CompletionOptions,
}

impl LlmSummarizer {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: LlmApiClient::new(config)?,
            options: CompletionOptions {
                temperature: Some(config.temperature),
                max_tokens: Some(config.max_tokens),
            },
        })
    }

    async fn request_summary(&self, text: &str, max_length_hint: usize) -> Result<SummaryResult> {
        let prepared = truncate_for_summary(text, max_length_hint);
        let prompt = prompts::summary_prompt(&prepared);
        let value = self
            .client
            .complete_json(prompts::SUMMARY_SYSTEM_PROMPT, &prompt, &self.options)
            .await?;
        parse_summary(value)
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, text: &str, max_length_hint: usize) -> SummaryResult {
        if text.trim().is_empty() {
            return SummaryResult::empty();
        }

        match self.request_summary(text, max_length_hint).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!("Error generating summary: {}", e);
                SummaryResult::placeholder(e.detail())
            }
        }
    }
}

/// Cuts `text` to `max_length_hint * 4` characters and appends the
/// truncation marker when anything was dropped.
pub fn truncate_for_summary(text: &str, max_length_hint: usize) -> Cow<'_, str> {
    let char_limit = max_length_hint.saturating_mul(4);

    match text.char_indices().nth(char_limit) {
        Some((cut, _)) => {
            tracing::warn!(
                "Content truncated from {} to {} characters",
                text.chars().count(),
                char_limit
            );
            Cow::Owned(format!("{}{}", &text[..cut], TRUNCATION_MARKER))
        }
        None => Cow::Borrowed(text),
    }
}

/// Reads `summary` and `key_concepts` from the model's JSON object; a missing
/// field falls back to its default.
fn parse_summary(value: Value) -> Result<SummaryResult> {
    let Value::Object(mut fields) = value else {
        return Err(MtextsError::Llm(
            "Summary response was not a JSON object".to_string(),
        ));
    };

    if !fields.contains_key("summary") || !fields.contains_key("key_concepts") {
        tracing::warn!("API response missing expected fields");
    }

    let summary = match fields.remove("summary") {
        Some(Value::String(summary)) => summary,
        Some(other) => other.to_string(),
        None => MISSING_SUMMARY.to_string(),
    };

    let key_concepts = match fields.remove("key_concepts") {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(concept) => concept,
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(single)) => vec![single],
        _ => Vec::new(),
    };

    Ok(SummaryResult::new(summary, key_concepts))
}
