/*!
 * In-memory page model: the document tree, text node selection and the undo log.
 */

pub use self::document::{Document, NodeId};
pub use self::selector::{TextUnit, is_translatable_text, select_translatable_units};
pub use self::undo::{ContainerId, RevertSummary, UndoRecord, UndoStore};

pub mod document;
pub mod selector;
pub mod undo;

/// A document together with the undo log of translations applied to it
#[derive(Debug, Default)]
pub struct PageState {
    /// The live document
    pub document: Document,
    /// Original values of translated nodes
    pub undo: UndoStore,
}

impl PageState {
    /// Wrap a document with an empty undo log
    pub fn new(document: Document) -> Self {
        Self {
            document,
            undo: UndoStore::new(),
        }
    }

    /// Overwrite `unit` with a translated fragment, recording its original value.
    ///
    /// Returns false when the fragment is empty after trimming or the node can
    /// no longer be recorded; the node is left untouched in that case.
    pub fn apply_translation(&mut self, unit: &TextUnit, fragment: &str) -> bool {
        let translated = fragment.trim();
        if translated.is_empty() {
            return false;
        }
        let Some(container) = self.undo.record(&self.document, unit.node) else {
            return false;
        };
        self.document.set_text(unit.node, translated);
        self.undo.mark_container(&mut self.document, container);
        true
    }

    /// Restore the document to its pre-translation state
    pub fn revert(&mut self) -> RevertSummary {
        self.undo.revert(&mut self.document)
    }
}
