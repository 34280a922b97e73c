use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::error::{MtextsError, Result};
use crate::processing::Capabilities;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub drive: DriveConfig,
    pub extraction: ExtractionConfig,
}

/// Settings for the summarization model.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// First delay of the rate-limit backoff, doubled on every retry.
    pub retry_initial_delay_ms: u64,
    pub temperature: f32,
    /// Upper bound on tokens the model may generate for one summary.
    pub max_tokens: u32,
    /// Rough token budget of the text sent for summarization (4 chars per token).
    pub input_token_limit: usize,
}

#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub api_base: String,
    pub page_size: u32,
    pub timeout_secs: u64,
}

/// Format families the dispatcher is allowed to parse locally.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub docx: bool,
    pub pptx: bool,
    pub html: bool,
}

impl ExtractionConfig {
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            docx: self.docx,
            pptx: self.pptx,
            html: self.html,
        }
    }
}

/// Keys accepted in the optional JSON configuration file. Every present key
/// overrides the value taken from the environment.
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    openai_api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    temperature: Option<f32>,
    summary_max_tokens: Option<u32>,
    input_token_limit: Option<usize>,
    drive_page_size: Option<u32>,
    extract_docx: Option<bool>,
    extract_pptx: Option<bool>,
    extract_html: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                base_url: env::var("OPENAI_BASE_URL").ok(),
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 60),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 5),
                retry_initial_delay_ms: parse_env_or("LLM_RETRY_DELAY_MS", 1000),
                temperature: parse_env_or("LLM_TEMPERATURE", 0.3),
                max_tokens: parse_env_or("SUMMARY_MAX_TOKENS", 1000),
                input_token_limit: parse_env_or("SUMMARY_INPUT_TOKENS", 8000),
            },
            drive: DriveConfig {
                api_base: env::var("DRIVE_API_BASE")
                    .unwrap_or_else(|_| "https://www.googleapis.com/drive/v3".to_string()),
                page_size: parse_env_or("DRIVE_PAGE_SIZE", 1000),
                timeout_secs: parse_env_or("DRIVE_TIMEOUT", 60),
            },
            extraction: ExtractionConfig {
                docx: parse_env_or("EXTRACT_DOCX", true),
                pptx: parse_env_or("EXTRACT_PPTX", true),
                html: parse_env_or("EXTRACT_HTML", true),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Environment first, then the JSON file at `path` when it exists, then validation.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_env();

        if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            let overrides: FileOverrides = serde_json::from_str(&raw).map_err(|e| {
                MtextsError::Config(format!("Invalid config file {}: {e}", path.display()))
            })?;
            config.apply(overrides);
            tracing::debug!("Loaded configuration overrides from {}", path.display());
        }

        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, overrides: FileOverrides) {
        if let Some(key) = overrides.openai_api_key {
            self.llm.api_key = key;
        }
        if let Some(base_url) = overrides.base_url {
            self.llm.base_url = Some(base_url);
        }
        if let Some(model) = overrides.model {
            self.llm.model = model;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.llm.timeout_secs = timeout;
        }
        if let Some(retries) = overrides.max_retries {
            self.llm.max_retries = retries;
        }
        if let Some(temperature) = overrides.temperature {
            self.llm.temperature = temperature;
        }
        if let Some(max_tokens) = overrides.summary_max_tokens {
            self.llm.max_tokens = max_tokens;
        }
        if let Some(limit) = overrides.input_token_limit {
            self.llm.input_token_limit = limit;
        }
        if let Some(page_size) = overrides.drive_page_size {
            self.drive.page_size = page_size;
        }
        if let Some(docx) = overrides.extract_docx {
            self.extraction.docx = docx;
        }
        if let Some(pptx) = overrides.extract_pptx {
            self.extraction.pptx = pptx;
        }
        if let Some(html) = overrides.extract_html {
            self.extraction.html = html;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(MtextsError::Config(
                "OpenAI API key not found. Set OPENAI_API_KEY environment variable or add openai_api_key to config.json"
                    .to_string(),
            ));
        }
        if self.drive.page_size == 0 {
            return Err(MtextsError::Config(
                "DRIVE_PAGE_SIZE must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
