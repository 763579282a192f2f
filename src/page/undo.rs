/*!
 * Undo log for translated text.
 *
 * Every container element touched by a translation gets a synthetic id the
 * first time it is touched. Original values are stored under that id as
 * (child position, value) pairs, so revert walks container children instead of
 * relying on node identity.
 */

use std::collections::{BTreeMap, HashMap};

use log::debug;

use super::document::{Document, NodeId};

/// Attribute flagging a container as holding translated text
pub const TRANSLATED_ATTR: &str = "data-translated";

/// Inline style appended to translated containers
pub const MARKER_STYLE: &str = "background: linear-gradient(90deg, rgba(102, 126, 234, 0.1) 0%, rgba(118, 75, 162, 0.1) 100%); border-left: 3px solid #667eea; padding-left: 8px; transition: all 0.3s ease;";

/// Synthetic identifier of a touched container
pub type ContainerId = u64;

/// Original value of one text node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoEntry {
    /// Position of the text node among the container's children
    pub child_index: usize,
    /// Untrimmed value before translation
    pub original: String,
}

/// Everything needed to restore one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRecord {
    /// The container element
    pub container: NodeId,
    /// Original values, in the order they were recorded
    pub entries: Vec<UndoEntry>,
    /// `style` attribute before the marker was applied; `None` if unmarked by us
    marker: Option<Option<String>>,
}

impl UndoRecord {
    /// Whether this record applied the visual marker
    pub fn is_marked(&self) -> bool {
        self.marker.is_some()
    }
}

/// Result of a revert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevertSummary {
    /// Text nodes set back to their original value
    pub restored_nodes: usize,
    /// Containers whose marker was removed
    pub cleared_markers: usize,
}

/// Per-document undo log
#[derive(Debug, Default)]
pub struct UndoStore {
    next_id: ContainerId,
    ids: HashMap<NodeId, ContainerId>,
    records: BTreeMap<ContainerId, UndoRecord>,
}

impl UndoStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of containers with records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Number of recorded text values across all containers
    pub fn entry_count(&self) -> usize {
        self.records.values().map(|r| r.entries.len()).sum()
    }

    /// Records ordered by container id
    pub fn records(&self) -> impl Iterator<Item = (ContainerId, &UndoRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    /// Record for a container id
    pub fn get(&self, id: ContainerId) -> Option<&UndoRecord> {
        self.records.get(&id)
    }

    /// Id of `container`, assigned on first use
    pub fn container_id(&mut self, container: NodeId) -> ContainerId {
        if let Some(id) = self.ids.get(&container) {
            return *id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(container, id);
        self.records.insert(
            id,
            UndoRecord {
                container,
                entries: Vec::new(),
                marker: None,
            },
        );
        id
    }

    /// Save the current value of text node `node` under its container.
    ///
    /// Returns the container id, or `None` when the node has no element parent
    /// or is not a text node.
    pub fn record(&mut self, doc: &Document, node: NodeId) -> Option<ContainerId> {
        let original = doc.text(node)?.to_string();
        let container = doc.parent_element(node)?;
        let child_index = doc.child_position(node)?;
        let id = self.container_id(container);
        if let Some(record) = self.records.get_mut(&id) {
            record.entries.push(UndoEntry {
                child_index,
                original,
            });
        }
        Some(id)
    }

    /// Apply the visual marker to a recorded container once
    pub fn mark_container(&mut self, doc: &mut Document, id: ContainerId) {
        let Some(record) = self.records.get_mut(&id) else {
            return;
        };
        if record.is_marked() || doc.attribute(record.container, TRANSLATED_ATTR).is_some() {
            return;
        }
        let previous = doc.attribute(record.container, "style").map(str::to_string);
        let style = match previous.as_deref().map(str::trim) {
            Some(existing) if !existing.is_empty() => {
                let separator = if existing.ends_with(';') { " " } else { "; " };
                format!("{existing}{separator}{MARKER_STYLE}")
            }
            _ => MARKER_STYLE.to_string(),
        };
        doc.set_attribute(record.container, TRANSLATED_ATTR, "true");
        doc.set_attribute(record.container, "style", &style);
        record.marker = Some(previous);
    }

    /// Restore every recorded value, remove every marker and empty the store.
    ///
    /// Safe to call at any time; on an empty store it only sweeps stray markers
    /// left with the translation style.
    pub fn revert(&mut self, doc: &mut Document) -> RevertSummary {
        let mut summary = RevertSummary::default();

        for record in self.records.values().rev() {
            for entry in record.entries.iter().rev() {
                match doc.child_at(record.container, entry.child_index) {
                    Some(node) if doc.set_text(node, &entry.original) => summary.restored_nodes += 1,
                    _ => debug!(
                        "Skipping undo entry: child {} of container {:?} is gone",
                        entry.child_index, record.container
                    ),
                }
            }
            if let Some(previous_style) = &record.marker {
                doc.remove_attribute(record.container, TRANSLATED_ATTR);
                match previous_style {
                    Some(style) => {
                        doc.set_attribute(record.container, "style", style);
                    }
                    None => {
                        doc.remove_attribute(record.container, "style");
                    }
                }
                summary.cleared_markers += 1;
            }
        }

        // Only elements still carrying the marker style
        let stray: Vec<NodeId> = doc
            .elements_with_attribute(TRANSLATED_ATTR, "true")
            .into_iter()
            .filter(|element| doc.attribute(*element, "style").is_some_and(|s| s.contains(MARKER_STYLE)))
            .collect();
        for element in stray {
            doc.remove_attribute(element, TRANSLATED_ATTR);
            if let Some(style) = doc.attribute(element, "style").map(str::to_string) {
                let stripped = style.replace(MARKER_STYLE, "");
                let stripped = stripped.trim().trim_end_matches(';').trim();
                if stripped.is_empty() {
                    doc.remove_attribute(element, "style");
                } else {
                    doc.set_attribute(element, "style", stripped);
                }
            }
            summary.cleared_markers += 1;
        }

        self.clear();
        summary
    }

    /// Drop all records and restart container ids at zero
    pub fn clear(&mut self) {
        self.records.clear();
        self.ids.clear();
        self.next_id = 0;
    }
}
