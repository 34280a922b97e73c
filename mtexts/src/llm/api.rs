use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use serde_json::Value;

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
        ResponseFormat,
    },
    Client,
};

use crate::{
    config::LlmConfig,
    error::{MtextsError, Result},
};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Longest single wait between rate-limited attempts.
const MAX_RETRY_INTERVAL: Duration = Duration::from_secs(120);

/// Share of each retry wait that is randomized. Jitter only lengthens a
/// wait, so the n-th wait never drops below `2^n * 2 * initial_delay`.
const RETRY_JITTER: f64 = 0.2;

#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
struct ApiConfig {
    model: String,
    max_retries: u32,
    retry_initial_delay: Duration,
}

#[derive(Clone)]
pub struct LlmApiClient {
    client: Client<OpenAIConfig>,
    config: ApiConfig,
}

impl LlmApiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(MtextsError::Llm("API key required".to_string()));
        }

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| OPENAI_BASE_URL.to_string());

        let openai_config = OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key(config.api_key.clone());

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| {
                MtextsError::Llm(format!("Failed to create LLM HTTP client: {error}"))
            })?;

        // async-openai would otherwise retry 429s on its own schedule; rate
        // limits are retried in complete_json instead.
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(backoff);

        Ok(Self {
            client,
            config: ApiConfig {
                model: config.model.clone(),
                max_retries: config.max_retries,
                retry_initial_delay: Duration::from_millis(config.retry_initial_delay_ms),
            },
        })
    }

    /// Sends a system + user prompt pair in JSON-object mode and parses the reply.
    pub async fn complete_json(
        &self,
        system_prompt: &str,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<Value> {
        if prompt.trim().is_empty() {
            return Err(MtextsError::Validation("Prompt cannot be empty".to_string()));
        }

        let request = self.build_json_request(system_prompt, prompt, options)?;
        let response = self.create_with_retry(request).await?;
        let content = Self::extract_content(response)?;
        tracing::debug!(response_len = content.len(), "LLM JSON response received");

        serde_json::from_str(&content).map_err(|e| {
            tracing::error!(response_len = content.len(), response_preview = %&content.chars().take(100).collect::<String>(), error = %e, "Failed to parse JSON response");
            MtextsError::Llm(format!("Failed to parse JSON response: {e}"))
        })
    }

    /// Retries rate-limited calls with randomized exponential backoff.
    /// `max_retries` bounds the total number of attempts; any other error is
    /// returned immediately.
    async fn create_with_retry(
        &self,
        request: CreateChatCompletionRequest,
    ) -> Result<CreateChatCompletionResponse> {
        let mut schedule = Self::retry_schedule(self.config.retry_initial_delay);
        let mut attempt: u32 = 1;

        loop {
            match self.client.chat().create(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    let Some(rate_limit_error) = Self::rate_limit_error(&error) else {
                        return Err(Self::map_openai_error(error));
                    };

                    if attempt >= self.config.max_retries {
                        return Err(rate_limit_error);
                    }

                    let delay = schedule.next_backoff().unwrap_or(MAX_RETRY_INTERVAL);
                    tracing::warn!(
                        "Rate limited. Retrying in {:.2} seconds...",
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Doubling waits starting at `2 * initial_delay`. The randomized range
    /// is centred above the base wait so its lower edge is the base wait.
    fn retry_schedule(initial_delay: Duration) -> ExponentialBackoff {
        let floor = initial_delay * 2;
        ExponentialBackoffBuilder::new()
            .with_initial_interval(floor.mul_f64(1.0 / (1.0 - RETRY_JITTER)))
            .with_randomization_factor(RETRY_JITTER)
            .with_multiplier(2.0)
            .with_max_interval(MAX_RETRY_INTERVAL)
            .with_max_elapsed_time(None)
            .build()
    }

    fn build_json_request(
        &self,
        system_prompt: &str,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<CreateChatCompletionRequest> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|error| MtextsError::Validation(format!("Invalid system prompt: {error}")))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|error| MtextsError::Validation(format!("Invalid user prompt: {error}")))?
                .into(),
        ];

        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(self.config.model.clone())
            .messages(messages)
            .response_format(ResponseFormat::JsonObject);

        if let Some(temperature) = options.temperature {
            request.temperature(temperature);
        }
        if let Some(max_tokens) = options.max_tokens {
            request.max_tokens(max_tokens);
        }

        request
            .build()
            .map_err(|error| MtextsError::Validation(format!("Invalid LLM JSON request: {error}")))
    }

    fn extract_content(response: CreateChatCompletionResponse) -> Result<String> {
        let message = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| MtextsError::Llm("LLM response contained no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        if message.trim().is_empty() {
            return Err(MtextsError::Llm(
                "LLM response contained empty content".to_string(),
            ));
        }

        Ok(message)
    }

    fn rate_limit_error(error: &OpenAIError) -> Option<MtextsError> {
        match error {
            OpenAIError::Reqwest(reqwest_error)
                if reqwest_error.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) =>
            {
                Some(MtextsError::LlmRateLimit { retry_after: None })
            }
            OpenAIError::ApiError(api_error) if Self::is_rate_limit_api_error(api_error) => {
                Some(MtextsError::LlmRateLimit { retry_after: None })
            }
            _ => None,
        }
    }

    /// Quota exhaustion also answers 429 but never clears by waiting.
    fn is_rate_limit_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        if code == "insufficient_quota" || error_type == "insufficient_quota" {
            return false;
        }

        message.contains("rate limit")
            || message.contains("too many requests")
            || error_type.contains("rate_limit")
            || code.contains("rate_limit")
    }

    fn map_openai_error(error: OpenAIError) -> MtextsError {
        match error {
            OpenAIError::Reqwest(reqwest_error) => {
                MtextsError::Llm(format!("LLM request failed: {reqwest_error}"))
            }
            OpenAIError::ApiError(api_error) => {
                MtextsError::Llm(format!("LLM API error: {api_error}"))
            }
            OpenAIError::JSONDeserialize(err) => {
                MtextsError::Llm(format!("Failed to parse LLM response: {err}"))
            }
            OpenAIError::InvalidArgument(message) => MtextsError::Validation(message),
            other => MtextsError::Llm(other.to_string()),
        }
    }
}
