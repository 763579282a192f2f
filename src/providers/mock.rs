/*!
 * Mock translator implementations for testing.
 *
 * This module provides a translator that simulates different endpoint behaviors:
 * - `MockTranslator::working()` - Always succeeds, tagging every section
 * - `MockTranslator::intermittent(n)` - Fails every Nth request
 * - `MockTranslator::failing()` - Always fails with an API error
 * - `MockTranslator::merged()` - Loses the section separators
 * - `MockTranslator::slow(ms)` - Succeeds after a delay
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::providers::Translator;
use crate::translation::prompts::SECTION_SEPARATOR;

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, keeping one translated section per input section
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns a single section no matter how many were sent
    Merged,
    /// Returns an empty string
    Empty,
    /// Simulates a slow endpoint
    Slow { delay_ms: u64 },
}

/// Scripted translator that never touches the network
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
    custom_response: Option<fn(&str, &TranslationConfig) -> String>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn merged() -> Self {
        Self::new(MockBehavior::Merged)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator used by successful behaviors
    pub fn with_custom_response(mut self, generator: fn(&str, &TranslationConfig) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of translate calls received so far (shared between clones)
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Texts received so far, in call order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Tag every separator-delimited section with the target language
    pub fn tag_sections(text: &str, target_language: &str) -> String {
        text.split(SECTION_SEPARATOR)
            .map(|section| format!("[{}] {}", target_language, section))
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR)
    }

    fn success(&self, text: &str, config: &TranslationConfig) -> String {
        match self.custom_response {
            Some(generator) => generator(text, config),
            None => Self::tag_sections(text, &config.target_language_name),
        }
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, config: &TranslationConfig) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(text.to_string());

        match self.behavior {
            MockBehavior::Working => Ok(self.success(text, config).trim().to_string()),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        status_text: "Service Unavailable".to_string(),
                        detail: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(self.success(text, config).trim().to_string())
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                status_text: "Internal Server Error".to_string(),
                detail: "Simulated provider failure".to_string(),
            }),

            MockBehavior::Merged => {
                let first = text.split(SECTION_SEPARATOR).next().unwrap_or_default();
                Ok(self.success(first, config).trim().to_string())
            }

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(self.success(text, config).trim().to_string())
            }
        }
    }
}
