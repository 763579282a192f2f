/*!
 * Selection of translatable text nodes.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::document::{Document, NodeId};

/// Container tags whose text is never translated
pub const SKIP_TAGS: &[&str] = &["script", "style", "code", "pre", "noscript", "textarea"];

/// Shortest trimmed text considered worth translating
pub const MIN_TEXT_CHARS: usize = 3;

// Digits, whitespace and symbols only: nothing a model could translate.
static NO_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\d\s\W_]*$").expect("static pattern compiles")
});

/// One piece of translatable text within a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    /// Handle to the text node
    pub node: NodeId,
    /// Trimmed text at selection time
    pub original: String,
}

/// Decide whether a trimmed string is worth sending to the model
pub fn is_translatable_text(trimmed: &str) -> bool {
    if trimmed.chars().count() < MIN_TEXT_CHARS || trimmed.trim().is_empty() {
        return false;
    }
    !NO_WORDS.is_match(trimmed)
}

/// Collect every eligible text node under `root`, in document order.
///
/// A text node is eligible when its parent is an element outside `SKIP_TAGS`
/// and its trimmed value passes `is_translatable_text`. The walk has no side
/// effects, so calling it again after a mutation reflects the current tree.
pub fn select_translatable_units(doc: &Document, root: NodeId) -> Vec<TextUnit> {
    doc.descendants(root)
        .filter_map(|id| {
            let text = doc.text(id)?;
            let container = doc.parent_element(id)?;
            let tag = doc.tag_name(container)?;
            if SKIP_TAGS.contains(&tag) {
                return None;
            }
            let trimmed = text.trim();
            is_translatable_text(trimmed).then(|| TextUnit {
                node: id,
                original: trimmed.to_string(),
            })
        })
        .collect()
}
