use serde::{Deserialize, Serialize};

pub const NO_CONTENT_SUMMARY: &str = "No content available to summarize.";
pub const MISSING_SUMMARY: &str = "Summary generation failed.";
pub const FAILED_CONCEPT: &str = "Summary generation failed";

/// Abstractive summary plus a short list of key concepts (3-7 expected, not enforced).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryResult {
    pub summary: String,
    pub key_concepts: Vec<String>,
}

impl SummaryResult {
    pub fn new(summary: impl Into<String>, key_concepts: Vec<String>) -> Self {
        Self {
            summary: summary.into(),
            key_concepts,
        }
    }

    /// Result used when there was nothing to summarize.
    pub fn empty() -> Self {
        Self::new(NO_CONTENT_SUMMARY, Vec::new())
    }

    /// Result standing in for a failed summarization.
    pub fn placeholder(reason: impl std::fmt::Display) -> Self {
        Self::new(
            format!("Error generating summary: {reason}"),
            vec![FAILED_CONCEPT.to_string()],
        )
    }
}
