/*!
 * Error types for the pagewai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Maximum number of characters of a response body carried inside an error
pub const ERROR_DETAIL_LIMIT: usize = 500;

/// Errors that can occur when calling a model endpoint
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// No response arrived within the configured ceiling
    #[error("Translation request timed out after {seconds} seconds.")]
    Timeout {
        /// The ceiling that was exceeded
        seconds: u64,
    },

    /// The endpoint answered with a non-success status
    #[error("Translation API error: {status_code} {status_text}. Detail: {detail}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Canonical reason phrase for the status
        status_text: String,
        /// Error message extracted from the body, bounded in length
        detail: String,
    },

    /// The body of a successful response was not JSON
    #[error("Failed to parse JSON response from translation API. Snippet: {0}")]
    ParseError(String),

    /// The body was JSON but matched neither known response shape
    #[error("Unexpected API response format")]
    FormatError,

    /// The request could not be sent or the body could not be read
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// The caller cancelled the request before it completed
    #[error("Translation request cancelled")]
    Cancelled,
}

/// Errors that end a page translation job before any batch is sent
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobError {
    /// Node selection produced nothing to translate
    #[error("No translatable content found on this page")]
    SelectionEmpty,

    /// The page has no usable root to translate
    #[error("Could not access the page document: {0}")]
    DocumentUnavailable(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from a translation job
    #[error("Job error: {0}")]
    Job(#[from] JobError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

/// Truncate `text` to at most `limit` characters, respecting char boundaries
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
