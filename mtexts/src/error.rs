use thiserror::Error;

#[derive(Error, Debug)]
pub enum MtextsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Drive error: {0}")]
    Drive(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },
}

impl MtextsError {
    /// Message without the variant prefix, used inside bracketed failure strings.
    pub fn detail(&self) -> String {
        match self {
            Self::Config(msg)
            | Self::Auth(msg)
            | Self::Drive(msg)
            | Self::Processing(msg)
            | Self::Validation(msg)
            | Self::Llm(msg) => msg.clone(),
            Self::Http(e) => e.to_string(),
            Self::Json(e) => e.to_string(),
            Self::Io(e) => e.to_string(),
            Self::UrlParse(e) => e.to_string(),
            Self::LlmRateLimit { .. } => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MtextsError>;
