/*!
 * Batch translation processing.
 *
 * Selected text units are grouped into fixed-size batches. Each batch is sent
 * as one request with its sections joined by the separator, and the reply is
 * split back and applied to the page positionally. A failed or malformed
 * batch never stops the batches after it.
 */

use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::app_config::TranslationConfig;
use crate::page::{PageState, TextUnit};
use crate::providers::Translator;

use super::prompts::{join_sections, split_sections};

/// Number of text units per request unless configured otherwise
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// A contiguous slice of the selected units
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Zero-based position of the batch in the job
    pub index: usize,
    /// Units in document order
    pub units: Vec<TextUnit>,
}

impl Batch {
    /// Request body text: the unit originals joined by the separator
    pub fn combined_text(&self) -> String {
        let originals: Vec<&str> = self.units.iter().map(|unit| unit.original.as_str()).collect();
        join_sections(&originals)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Split units into consecutive batches of at most `batch_size` units.
///
/// Order is preserved and only the last batch may be short. A size of zero
/// is treated as one.
pub fn make_batches(units: &[TextUnit], batch_size: usize) -> Vec<Batch> {
    units
        .chunks(batch_size.max(1))
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            units: chunk.to_vec(),
        })
        .collect()
}

/// How a single batch ended
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// The reply was applied (possibly partially, see `BatchReport::mismatched`)
    Applied,
    /// The request failed; nothing in this batch was changed
    Failed(String),
    /// Abort was requested before or during the request; nothing was changed
    Aborted,
}

/// Summary of one processed batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub batch_index: usize,
    /// Units whose text was replaced
    pub applied: usize,
    /// Units left untouched (missing or empty fragment)
    pub skipped: usize,
    /// The reply section count differed from the batch size
    pub mismatched: bool,
    pub outcome: BatchOutcome,
}

impl BatchReport {
    fn untouched(batch: &Batch, outcome: BatchOutcome) -> Self {
        Self {
            batch_index: batch.index,
            applied: 0,
            skipped: batch.len(),
            mismatched: false,
            outcome,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.outcome == BatchOutcome::Aborted
    }
}

/// Sends batches through a translator and writes the results into a page
pub struct BatchApplier<'a> {
    translator: &'a dyn Translator,
    page: &'a Mutex<PageState>,
    abort: &'a AtomicBool,
}

impl<'a> BatchApplier<'a> {
    pub fn new(translator: &'a dyn Translator, page: &'a Mutex<PageState>, abort: &'a AtomicBool) -> Self {
        Self { translator, page, abort }
    }

    /// Translate one batch and apply its sections.
    ///
    /// Never returns an error: request failures are logged and reported in
    /// the outcome. The abort flag is checked before the request and again
    /// after it, so a reply that arrives after an abort is discarded.
    pub async fn apply_batch(&self, batch: &Batch, config: &TranslationConfig) -> BatchReport {
        if self.abort.load(Ordering::SeqCst) {
            return BatchReport::untouched(batch, BatchOutcome::Aborted);
        }

        let text = batch.combined_text();
        debug!(
            "Translating batch {} ({} units, {} chars)",
            batch.index + 1,
            batch.len(),
            text.chars().count()
        );

        let translated = match self.translator.translate(&text, config).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Batch {} translation failed: {}", batch.index + 1, e);
                if self.abort.load(Ordering::SeqCst) {
                    return BatchReport::untouched(batch, BatchOutcome::Aborted);
                }
                return BatchReport::untouched(batch, BatchOutcome::Failed(e.to_string()));
            }
        };

        if self.abort.load(Ordering::SeqCst) {
            debug!("Discarding batch {} reply after abort", batch.index + 1);
            return BatchReport::untouched(batch, BatchOutcome::Aborted);
        }

        let sections = split_sections(&translated);
        let mismatched = sections.len() != batch.len();
        if mismatched {
            warn!(
                "Batch {} returned {} sections for {} units; applying positionally",
                batch.index + 1,
                sections.len(),
                batch.len()
            );
        }

        let mut page = self.page.lock();
        let mut applied = 0;
        for (unit, section) in batch.units.iter().zip(sections.iter()) {
            if page.apply_translation(unit, section) {
                applied += 1;
            }
        }

        BatchReport {
            batch_index: batch.index,
            applied,
            skipped: batch.len() - applied,
            mismatched,
            outcome: BatchOutcome::Applied,
        }
    }
}
