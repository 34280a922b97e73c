use serde::{Deserialize, Serialize};

/// Why a file produced no text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionFailure {
    /// No extractor is available for the type tag, either because the tag is
    /// unknown or because the format's capability is switched off.
    Unsupported {
        capability: String,
        type_tag: String,
    },
    /// A fetch or parse step failed.
    Failed {
        action: String,
        detail: String,
        type_tag: String,
    },
}

impl ExtractionFailure {
    pub fn unsupported(capability: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: capability.into(),
            type_tag: type_tag.into(),
        }
    }

    pub fn failed(
        action: impl Into<String>,
        detail: impl Into<String>,
        type_tag: impl Into<String>,
    ) -> Self {
        Self::Failed {
            action: action.into(),
            detail: detail.into(),
            type_tag: type_tag.into(),
        }
    }

    pub fn reason(&self) -> String {
        match self {
            Self::Unsupported { capability, .. } => format!("{capability} not supported"),
            Self::Failed { action, detail, .. } => format!("{action}: {detail}"),
        }
    }

    pub fn type_tag(&self) -> &str {
        match self {
            Self::Unsupported { type_tag, .. } | Self::Failed { type_tag, .. } => type_tag,
        }
    }
}

impl std::fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported {
                capability,
                type_tag,
            } => write!(f, "[{capability} not supported for file type: {type_tag}]"),
            Self::Failed { action, detail, .. } => write!(f, "[Error {action}: {detail}]"),
        }
    }
}

/// Outcome of extracting one file: text or a failure marker, never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExtractionResult {
    Text(String),
    Failed(ExtractionFailure),
}

impl ExtractionResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Failed(_) => None,
        }
    }

    /// Collapses the result into content text; failures become their bracketed form.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Failed(failure) => failure.to_string(),
        }
    }
}

impl From<std::result::Result<String, ExtractionFailure>> for ExtractionResult {
    fn from(outcome: std::result::Result<String, ExtractionFailure>) -> Self {
        match outcome {
            Ok(text) => Self::Text(text),
            Err(failure) => Self::Failed(failure),
        }
    }
}
