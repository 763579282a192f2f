/*!
 * Prompt templates for page and selection translation.
 */

/// Line used to join independent sections of a batch
pub const SECTION_SEPARATOR: &str = "\n---\n";

/// Prompt template with `{target_language}` and `{text}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Prompt for batched page text, asking the model to keep separators intact.
    pub const PAGE_TRANSLATOR: &'static str = r#"Translate the following text to {target_language}. Preserve the original formatting and structure. Only return the translated text, nothing else. If there are multiple sections separated by "---", translate each section separately and maintain the "---" separators.

Text to translate:
{text}"#;

    /// Prompt for a single user selection.
    pub const SELECTION_TRANSLATOR: &'static str = r#"Translate the following text to {target_language}. Only return the translated text, nothing else.

Text to translate:
{text}"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    pub fn page_translator() -> Self {
        Self::new(Self::PAGE_TRANSLATOR)
    }

    pub fn selection_translator() -> Self {
        Self::new(Self::SELECTION_TRANSLATOR)
    }

    /// Render the template. The text is substituted last so placeholders inside it survive.
    pub fn render(&self, target_language: &str, text: &str) -> String {
        self.template
            .replace("{target_language}", target_language)
            .replace("{text}", text)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::page_translator()
    }
}

/// Join section texts with the separator, preserving order
pub fn join_sections<S: AsRef<str>>(sections: &[S]) -> String {
    sections
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

/// Split a translated block back into sections
pub fn split_sections(text: &str) -> Vec<&str> {
    text.split(SECTION_SEPARATOR).collect()
}
