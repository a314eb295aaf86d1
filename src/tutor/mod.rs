use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

pub mod types;

use types::*;

use crate::config::TutorConfig;
use crate::errors::TutorError;

/// Header carrying the API key on every request.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Prompt sent by the connectivity check.
pub const HELLO_PROMPT: &str = "Say hello from Gemini";

/// Trait abstraction over the tutor backend, enabling test mocking.
#[async_trait]
pub trait TutorClient: Send + Sync {
    /// Send one prompt and return the reply text.
    async fn ask(&self, prompt: &str) -> Result<String, TutorError>;
}

/// Build the tutor prompt for the learner's current step.
///
/// Returns `None` for a blank question; nothing is sent in that case.
pub fn build_prompt(pattern: &str, step: usize, code: &str, question: &str) -> Option<String> {
    let question = question.trim();
    if question.is_empty() {
        return None;
    }
    Some(format!(
        "Tutor for {}. Step {}: {}. Question: {}",
        pattern, step, code, question
    ))
}

/// Retry configuration for tutor calls
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay between retries (doubles each attempt)
    pub initial_delay_ms: u64,
    /// Maximum delay between retries
    pub max_delay_ms: u64,
    /// HTTP status codes that should trigger a retry
    pub retryable_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 500,
            max_delay_ms: 8000,
            retryable_status_codes: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    pub fn from_settings(settings: &TutorConfig) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_delay_ms: settings.initial_delay_ms,
            ..Self::default()
        }
    }

    fn next_delay(&self, delay_ms: u64) -> u64 {
        let doubled = delay_ms.saturating_mul(2).min(self.max_delay_ms);
        // ±10% jitter
        let jitter = (doubled as f64 * 0.1 * (rand::random::<f64>() - 0.5)) as i64;
        doubled.saturating_add_signed(jitter)
    }
}

/// Client for the Gemini `generateContent` REST API.
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
    retry_config: RetryConfig,
}

impl GeminiClient {
    pub fn new(config: &TutorConfig) -> anyhow::Result<Self> {
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.credential().map(String::from),
            timeout,
            retry_config: RetryConfig::from_settings(config),
        })
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn credential(&self) -> Result<&str, TutorError> {
        self.api_key.as_deref().ok_or(TutorError::MissingCredential)
    }

    fn map_send_error(&self, e: reqwest::Error) -> TutorError {
        if e.is_timeout() {
            TutorError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            TutorError::Network(e.to_string())
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, TutorError> {
        let key = self.credential()?;
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = GenerateContentRequest::from_prompt(prompt);

        let text = self
            .send_with_retry(|| self.client.post(&url).header(API_KEY_HEADER, key).json(&body))
            .await?;
        let response: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| TutorError::Parse(e.to_string()))?;
        response.text().ok_or(TutorError::EmptyResponse)
    }

    /// Models visible to the configured key.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, TutorError> {
        let key = self.credential()?;
        let url = format!("{}/models", self.endpoint);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let text = self
                .send_with_retry(|| {
                    let mut request = self.client.get(&url).header(API_KEY_HEADER, key);
                    if let Some(token) = &page_token {
                        request = request.query(&[("pageToken", token)]);
                    }
                    request
                })
                .await?;
            let page: ListModelsResponse =
                serde_json::from_str(&text).map_err(|e| TutorError::Parse(e.to_string()))?;
            models.extend(page.models);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(models)
    }

    /// Round-trip a fixed greeting to confirm the key and model work.
    pub async fn check(&self) -> Result<String, TutorError> {
        self.generate(HELLO_PROMPT).await
    }

    /// Send request with exponential backoff retry logic
    async fn send_with_retry<F>(&self, build: F) -> Result<String, TutorError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_error: Option<TutorError> = None;
        let mut delay_ms = self.retry_config.initial_delay_ms;

        for attempt in 0..=self.retry_config.max_retries {
            if attempt > 0 {
                warn!(
                    "Retry attempt {}/{} after {}ms delay",
                    attempt, self.retry_config.max_retries, delay_ms
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                delay_ms = self.retry_config.next_delay(delay_ms);
            }

            debug!("Sending tutor request (attempt {})", attempt + 1);

            match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response
                            .text()
                            .await
                            .map_err(|e| self.map_send_error(e))?;
                        debug!("Tutor response body ({} chars)", body.len());
                        return Ok(body);
                    }

                    let error_text = response.text().await.unwrap_or_default();
                    let err = TutorError::HttpStatus {
                        status: status.as_u16(),
                        message: summarize_error(&error_text),
                    };
                    if self
                        .retry_config
                        .retryable_status_codes
                        .contains(&status.as_u16())
                    {
                        warn!("Retryable error ({}): {}", status, err);
                        last_error = Some(err);
                        continue;
                    }
                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        warn!("Tutor rejected the API key ({})", status);
                    }
                    return Err(err);
                }
                Err(e) => {
                    if e.is_timeout() || e.is_connect() {
                        warn!("Network error (retrying): {}", e);
                        last_error = Some(self.map_send_error(e));
                        continue;
                    }
                    return Err(self.map_send_error(e));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| TutorError::Network("Request failed after retries".into())))
    }
}

/// Pull `error.message` out of a Google error body, else trim the raw text.
fn summarize_error(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[async_trait]
impl TutorClient for GeminiClient {
    async fn ask(&self, prompt: &str) -> Result<String, TutorError> {
        self.generate(prompt).await
    }
}
