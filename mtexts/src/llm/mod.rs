mod api;
pub mod prompts;
mod summarizer;

use async_trait::async_trait;

use crate::models::SummaryResult;

pub use api::{CompletionOptions, LlmApiClient};
pub use summarizer::{truncate_for_summary, LlmSummarizer, TRUNCATION_MARKER};

/// Produces a summary and key concepts for a document's text.
///
/// Implementations never fail: problems are reported inside the returned
/// `SummaryResult`.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// `max_length_hint` is a token budget; roughly four characters per token
    /// of `text` are considered.
    async fn summarize(&self, text: &str, max_length_hint: usize) -> SummaryResult;
}
