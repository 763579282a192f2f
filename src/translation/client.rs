/*!
 * HTTP translation client.
 *
 * Builds the prompt, picks the wire format from the endpoint URL, enforces a
 * per-call ceiling and normalizes every failure into a `ProviderError`.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::app_config::TranslationConfig;
use crate::errors::{ERROR_DETAIL_LIMIT, ProviderError, truncate_chars};
use crate::providers::ollama::{self, GenerationRequest};
use crate::providers::openai::{self, ChatRequest};
use crate::providers::{ApiResponse, EndpointKind, Translator};

use super::prompts::PromptTemplate;

/// Characters of the body kept when a connection check fails
const CHECK_DETAIL_LIMIT: usize = 100;

/// Tunables for the HTTP client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    /// Ceiling for batched page requests
    pub page_timeout: Duration,
    /// Ceiling for selection requests and connection checks
    pub selection_timeout: Duration,
    /// Token limit sent with chat-style page requests
    pub page_max_tokens: u32,
    /// Token limit sent with chat-style selection requests
    pub selection_max_tokens: u32,
    /// Sampling temperature sent with chat-style requests
    pub temperature: f32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            page_timeout: Duration::from_secs(180),
            selection_timeout: Duration::from_secs(30),
            page_max_tokens: 2000,
            selection_max_tokens: 1000,
            temperature: 0.3,
        }
    }
}

/// Which prompt and limits a request uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestProfile {
    /// Batched page text
    Page,
    /// A single user selection
    Selection,
}

/// Translation client talking to generate-style or chat-style endpoints
#[derive(Debug, Clone)]
pub struct TranslationClient {
    client: Client,
    settings: ClientSettings,
}

impl Default for TranslationClient {
    fn default() -> Self {
        Self::new(ClientSettings::default())
    }
}

impl TranslationClient {
    /// Create a client; timeouts are applied per request, not on the pool
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            client: Client::builder()
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            settings,
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Translate batched page text with the long ceiling
    pub async fn translate_text(&self, text: &str, config: &TranslationConfig) -> Result<String, ProviderError> {
        self.complete(text, config, RequestProfile::Page).await
    }

    /// Translate a user selection with the short ceiling and the simpler prompt
    pub async fn translate_selection(&self, text: &str, config: &TranslationConfig) -> Result<String, ProviderError> {
        self.complete(text, config, RequestProfile::Selection).await
    }

    /// Like `translate_text`, but gives up with `Cancelled` once `token` fires
    pub async fn translate_cancellable(
        &self,
        text: &str,
        config: &TranslationConfig,
        token: &CancellationToken,
    ) -> Result<String, ProviderError> {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("Translation request cancelled by caller");
                Err(ProviderError::Cancelled)
            }
            result = self.translate_text(text, config) => result,
        }
    }

    /// Check the endpoint without generating anything
    pub async fn test_connection(&self, config: &TranslationConfig) -> Result<(), ProviderError> {
        let kind = EndpointKind::detect(&config.endpoint_url);
        let url = match kind {
            EndpointKind::Generate => ollama::tags_url(&config.endpoint_url),
            EndpointKind::Chat => openai::models_url(&config.endpoint_url),
        };
        debug!("Testing {} endpoint at {}", kind.display_name(), url);

        let timeout = self.settings.selection_timeout;
        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| request_error(e, timeout))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        error!("Connection test failed for {} ({}): {}", url, status, body);
        Err(ProviderError::ApiError {
            status_code: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            detail: truncate_chars(&body, CHECK_DETAIL_LIMIT),
        })
    }

    async fn complete(
        &self,
        text: &str,
        config: &TranslationConfig,
        profile: RequestProfile,
    ) -> Result<String, ProviderError> {
        let (template, timeout, max_tokens) = match profile {
            RequestProfile::Page => (
                PromptTemplate::page_translator(),
                self.settings.page_timeout,
                self.settings.page_max_tokens,
            ),
            RequestProfile::Selection => (
                PromptTemplate::selection_translator(),
                self.settings.selection_timeout,
                self.settings.selection_max_tokens,
            ),
        };
        let prompt = template.render(&config.target_language_name, text);

        let kind = EndpointKind::detect(&config.endpoint_url);
        let request = match kind {
            EndpointKind::Generate => self
                .client
                .post(ollama::generate_url(&config.endpoint_url))
                .json(&GenerationRequest::new(&config.model_name, prompt)),
            EndpointKind::Chat => self
                .client
                .post(openai::chat_completions_url(&config.endpoint_url))
                .json(
                    &ChatRequest::new(&config.model_name, prompt)
                        .max_tokens(max_tokens)
                        .temperature(self.settings.temperature),
                ),
        };
        debug!(
            "Calling {} API at {} with model {} ({} chars)",
            kind.display_name(),
            config.endpoint_url,
            config.model_name,
            text.chars().count()
        );

        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| request_error(e, timeout))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| request_error(e, timeout))?;

        if !status.is_success() {
            error!("{} API error ({}): {}", kind.display_name(), status, body);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                detail: error_detail(&body),
            });
        }

        parse_body(&body)
    }
}

#[async_trait]
impl Translator for TranslationClient {
    async fn translate(&self, text: &str, config: &TranslationConfig) -> Result<String, ProviderError> {
        self.translate_text(text, config).await
    }
}

fn request_error(error: reqwest::Error, timeout: Duration) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout {
            seconds: timeout.as_secs(),
        }
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Parse a success body and extract the translated text
pub fn parse_body(body: &str) -> Result<String, ProviderError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        error!("Failed to parse JSON response: {}", e);
        ProviderError::ParseError(truncate_chars(body, ERROR_DETAIL_LIMIT))
    })?;
    ApiResponse::classify(value).into_text()
}

/// Best human-readable detail for an error body.
///
/// Looks for an `error` field (stringified when it is an object), then a
/// `message` field, and otherwise falls back to the raw body. The result is
/// capped at `ERROR_DETAIL_LIMIT` characters.
pub fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for field in ["error", "message"] {
            match value.get(field) {
                Some(Value::String(text)) if !text.is_empty() => {
                    return truncate_chars(text, ERROR_DETAIL_LIMIT);
                }
                Some(Value::Null) | Some(Value::String(_)) | None => {}
                Some(other) => return truncate_chars(&other.to_string(), ERROR_DETAIL_LIMIT),
            }
        }
    }
    truncate_chars(body, ERROR_DETAIL_LIMIT)
}
