/*!
 * Application configuration module.
 *
 * Handles the settings a user chooses (endpoint, model, target language)
 * together with client tunables, and turns them into the immutable per-job
 * `TranslationConfig`.
 */

use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::translation::ClientSettings;

/// Target language value that selects `custom_language`
pub const CUSTOM_LANGUAGE: &str = "Custom";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "pagewai.json";

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the model endpoint
    #[serde(default = "default_llm_url")]
    pub llm_url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Target language name, ISO code, or `Custom`
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Language used when `target_language` is `Custom`
    #[serde(default)]
    pub custom_language: String,

    /// Number of text units per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// HTTP client tunables
    #[serde(default)]
    pub client: ClientConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Timeouts and generation limits for the HTTP client
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClientConfig {
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,

    #[serde(default = "default_selection_timeout_secs")]
    pub selection_timeout_secs: u64,

    /// Token limit for chat-style page requests
    #[serde(default = "default_page_max_tokens")]
    pub page_max_tokens: u32,

    /// Token limit for chat-style selection requests
    #[serde(default = "default_selection_max_tokens")]
    pub selection_max_tokens: u32,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_timeout_secs: default_page_timeout_secs(),
            selection_timeout_secs: default_selection_timeout_secs(),
            page_max_tokens: default_page_max_tokens(),
            selection_max_tokens: default_selection_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl ClientConfig {
    /// Settings for `TranslationClient`
    pub fn settings(&self) -> ClientSettings {
        ClientSettings {
            page_timeout: Duration::from_secs(self.page_timeout_secs),
            selection_timeout: Duration::from_secs(self.selection_timeout_secs),
            page_max_tokens: self.page_max_tokens,
            selection_max_tokens: self.selection_max_tokens,
            temperature: self.temperature,
        }
    }
}

/// Immutable settings captured when a job starts
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    /// Base URL of the model endpoint
    pub endpoint_url: String,
    /// Model identifier
    pub model_name: String,
    /// Human-readable target language inserted into prompts
    pub target_language_name: String,
}

impl TranslationConfig {
    pub fn new(endpoint_url: &str, model_name: &str, target_language_name: &str) -> Self {
        Self {
            endpoint_url: endpoint_url.to_string(),
            model_name: model_name.to_string(),
            target_language_name: target_language_name.to_string(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_llm_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama2".to_string()
}

fn default_target_language() -> String {
    "Spanish".to_string()
}

fn default_batch_size() -> usize {
    crate::translation::DEFAULT_BATCH_SIZE
}

fn default_page_timeout_secs() -> u64 {
    180
}

fn default_selection_timeout_secs() -> u64 {
    30
}

fn default_page_max_tokens() -> u32 {
    2000
}

fn default_selection_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.3
}

impl Default for Config {
    fn default() -> Self {
        Config {
            llm_url: default_llm_url(),
            model: default_model(),
            target_language: default_target_language(),
            custom_language: String::new(),
            batch_size: default_batch_size(),
            client: ClientConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load the configuration file, writing a default one when it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let file = File::open(path).context(format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .context(format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .context(format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.llm_url.trim().is_empty() {
            return Err(anyhow!("LLM URL must not be empty"));
        }
        Url::parse(self.llm_url.trim()).context(format!("Invalid LLM URL: {}", self.llm_url))?;

        if self.model.trim().is_empty() {
            return Err(anyhow!("Model name must not be empty"));
        }

        self.resolved_target_language()?;

        if self.batch_size == 0 {
            return Err(anyhow!("Batch size must be at least 1"));
        }
        if self.client.page_timeout_secs == 0 || self.client.selection_timeout_secs == 0 {
            return Err(anyhow!("Request timeouts must be greater than zero"));
        }

        Ok(())
    }

    /// Target language as it will appear in prompts
    pub fn resolved_target_language(&self) -> Result<String> {
        let raw = if self.target_language == CUSTOM_LANGUAGE {
            let custom = self.custom_language.trim();
            if custom.is_empty() {
                return Err(anyhow!("A custom language must be provided when target language is '{}'", CUSTOM_LANGUAGE));
            }
            custom
        } else {
            self.target_language.trim()
        };
        crate::language_utils::resolve_language_name(raw)
    }

    /// Snapshot of the settings a job needs
    pub fn translation_config(&self) -> Result<TranslationConfig> {
        Ok(TranslationConfig {
            endpoint_url: self.llm_url.trim().to_string(),
            model_name: self.model.trim().to_string(),
            target_language_name: self.resolved_target_language()?,
        })
    }
}
