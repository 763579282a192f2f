/*!
 * # PageWAI - Page translation With AI
 *
 * A Rust library for translating the text of HTML pages in place with a
 * local or remote LLM, and reverting the translation afterwards.
 *
 * ## Features
 *
 * - Selects translatable text nodes, skipping code, scripts and noise
 * - Translates in ordered batches through either API shape:
 *   - Ollama-style generate endpoints
 *   - OpenAI-compatible chat-completion endpoints
 * - Progress events, cooperative abort and one-step revert
 * - Selection translation and endpoint connection checks
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `page`: Document model, text selection and undo log
 * - `translation`: LLM client, prompts and batch processing
 * - `job`: Job controller, states and progress events
 * - `language_utils`: ISO language code utilities
 * - `providers`: Wire formats for the supported endpoint families:
 *   - `providers::ollama`: generate-style API types
 *   - `providers::openai`: chat-style API types
 *   - `providers::mock`: scripted translator for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod job;
pub mod language_utils;
pub mod page;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, TranslationConfig};
pub use errors::{AppError, JobError, ProviderError};
pub use job::{JobController, JobEvent, JobOutcome, JobState};
pub use language_utils::{get_language_name, normalize_to_part2t, resolve_language_name};
pub use page::{Document, PageState};
pub use providers::Translator;
pub use translation::TranslationClient;
