/*!
 * Model endpoint wire formats.
 *
 * Two request/response shapes are supported:
 * - `ollama`: generate-style (`POST /api/generate`, single prompt in, `response` out)
 * - `openai`: chat-style (`POST /v1/chat/completions`, message array in,
 *   `choices[0].message.content` out)
 *
 * The `mock` module holds a scripted translator used by tests and dry runs.
 */

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use url::Url;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;

use self::ollama::GenerationResponse;
use self::openai::ChatResponse;

pub mod mock;
pub mod ollama;
pub mod openai;

/// Anything that can turn a block of text into its translation
///
/// Implementations must not retry; retry and skip policy belongs to the caller.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate `text` according to `config`, returning the trimmed result
    async fn translate(&self, text: &str, config: &TranslationConfig) -> Result<String, ProviderError>;
}

/// Request/response shape spoken by an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Ollama-style generate endpoint
    Generate,
    /// OpenAI-compatible chat-completion endpoint
    Chat,
}

impl EndpointKind {
    /// Pick the shape from the endpoint URL.
    ///
    /// A local server on the Ollama default port, or any URL mentioning
    /// "ollama", is generate-style. Everything else is chat-style.
    pub fn detect(endpoint_url: &str) -> Self {
        let lowered = endpoint_url.to_lowercase();
        if lowered.contains("ollama") || lowered.contains("localhost:11434") {
            return Self::Generate;
        }
        if let Ok(url) = Url::parse(&lowered) {
            let local = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));
            if local && url.port() == Some(ollama::DEFAULT_PORT) {
                return Self::Generate;
            }
        }
        Self::Chat
    }

    /// Human readable API family name for logs
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Generate => "Ollama",
            Self::Chat => "OpenAI-compatible",
        }
    }
}

/// A successful response body, classified once
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Body carried a non-empty `response` field
    Generate(GenerationResponse),
    /// Body carried a non-empty `choices[0].message.content`
    Chat(ChatResponse),
    /// Valid JSON matching neither shape
    Unrecognized(Value),
}

impl ApiResponse {
    /// Classify a parsed body. The generate shape wins when both are present.
    pub fn classify(value: Value) -> Self {
        let has_response = value
            .get("response")
            .and_then(Value::as_str)
            .is_some_and(|text| !text.is_empty());
        if has_response {
            if let Ok(generated) = serde_json::from_value::<GenerationResponse>(value.clone()) {
                return Self::Generate(generated);
            }
        }

        if value.get("choices").is_some() {
            if let Ok(chat) = serde_json::from_value::<ChatResponse>(value.clone()) {
                if chat.first_content().is_some_and(|text| !text.is_empty()) {
                    return Self::Chat(chat);
                }
            }
        }

        Self::Unrecognized(value)
    }

    /// Extract the translated text with surrounding whitespace removed
    pub fn into_text(self) -> Result<String, ProviderError> {
        match self {
            Self::Generate(generated) => Ok(generated.response.trim().to_string()),
            Self::Chat(chat) => chat
                .first_content()
                .map(|text| text.trim().to_string())
                .ok_or(ProviderError::FormatError),
            Self::Unrecognized(_) => Err(ProviderError::FormatError),
        }
    }
}
