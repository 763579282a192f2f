/*!
 * Translation of page text through an LLM endpoint.
 *
 * - `client`: HTTP client speaking generate-style and chat-style APIs
 * - `batch`: Grouping of text units into requests and applying the replies
 * - `prompts`: Prompt templates and the section separator
 */

// Re-export main types for easier usage
pub use self::batch::{Batch, BatchApplier, BatchOutcome, BatchReport, DEFAULT_BATCH_SIZE, make_batches};
pub use self::client::{ClientSettings, RequestProfile, TranslationClient};
pub use self::prompts::{PromptTemplate, SECTION_SEPARATOR};

pub mod batch;
pub mod client;
pub mod prompts;
