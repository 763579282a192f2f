/*!
 * Job controller: owns the page, the undo log and the running/abort flags,
 * and drives one translation job at a time.
 */

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::app_config::TranslationConfig;
use crate::errors::JobError;
use crate::page::{Document, PageState, RevertSummary, select_translatable_units};
use crate::providers::Translator;
use crate::translation::{BatchApplier, BatchOutcome, DEFAULT_BATCH_SIZE, make_batches};

use super::events::{Emitter, EventSink, JobEvent, JobId, LogSink};

/// Message of the terminal error event after a user abort
pub const ABORT_MESSAGE: &str = "Translation stopped by user";

/// Lifecycle of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
    /// Abort requested, the loop has not reached a check point yet
    Aborting,
    Completed,
    Failed,
    Aborted,
}

impl JobState {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Aborting)
    }
}

/// Result of a `start` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// A job was already running; nothing happened
    Ignored,
    Completed,
    Failed(String),
    Aborted,
}

/// Clears the abort and running flags when the job loop exits, however it exits
struct RunningGuard<'a> {
    running: &'a AtomicBool,
    abort: &'a AtomicBool,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.abort.store(false, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
    }
}

enum RunEnd {
    Finished,
    Aborted,
}

/// Progress after `completed` of `total` batches, mapped onto 20..=90
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 90;
    }
    let progress = 20.0 + (completed as f64 / total as f64) * 70.0;
    progress.round().clamp(0.0, 100.0) as u8
}

/// Drives translation jobs against a single page
pub struct JobController {
    translator: Arc<dyn Translator>,
    page: Mutex<PageState>,
    sink: Arc<dyn EventSink>,
    state: Mutex<JobState>,
    running: AtomicBool,
    abort: AtomicBool,
    next_job_id: AtomicU64,
    batch_size: usize,
}

impl JobController {
    /// Create a controller for `document`, reporting to the log
    pub fn new(translator: Arc<dyn Translator>, document: Document) -> Self {
        Self::with_sink(translator, document, Arc::new(LogSink))
    }

    pub fn with_sink(translator: Arc<dyn Translator>, document: Document, sink: Arc<dyn EventSink>) -> Self {
        Self {
            translator,
            page: Mutex::new(PageState::new(document)),
            sink,
            state: Mutex::new(JobState::Idle),
            running: AtomicBool::new(false),
            abort: AtomicBool::new(false),
            next_job_id: AtomicU64::new(1),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the number of text units per request (zero is treated as one)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn state(&self) -> JobState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run a translation job to completion.
    ///
    /// Returns `Ignored` without emitting anything when a job is already
    /// running. Any previous translation is reverted silently first.
    pub async fn start(&self, config: &TranslationConfig) -> JobOutcome {
        let Some(guard) = self.claim() else {
            debug!("Translation already running, ignoring start");
            return JobOutcome::Ignored;
        };
        self.run_claimed(guard, config).await
    }

    /// Take the running flag; `None` while another job holds it
    fn claim(&self) -> Option<RunningGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(RunningGuard {
            running: &self.running,
            abort: &self.abort,
        })
    }

    async fn run_claimed(&self, _guard: RunningGuard<'_>, config: &TranslationConfig) -> JobOutcome {
        {
            let mut page = self.page.lock();
            if !page.undo.is_empty() {
                let summary = page.revert();
                debug!(
                    "Reverted {} nodes from the previous translation before starting",
                    summary.restored_nodes
                );
            }
            page.undo.clear();
        }
        // An abort that arrived since the claim is kept
        *self.state.lock() = if self.abort_requested() {
            JobState::Aborting
        } else {
            JobState::Running
        };

        let job_id = self.next_job_id.fetch_add(1, Ordering::SeqCst);
        let emitter = Emitter::new(job_id, self.sink.clone());
        info!(
            "Starting translation job {} to {} with {}",
            job_id, config.target_language_name, config.model_name
        );

        let (state, outcome) = match self.run(config, &emitter).await {
            Ok(RunEnd::Finished) => {
                emitter.emit(JobEvent::complete());
                info!("Translation job {} complete", job_id);
                (JobState::Completed, JobOutcome::Completed)
            }
            Ok(RunEnd::Aborted) => {
                emitter.emit(JobEvent::error(ABORT_MESSAGE));
                info!("Translation job {} stopped by user", job_id);
                (JobState::Aborted, JobOutcome::Aborted)
            }
            Err(e) => {
                let message = e.to_string();
                error!("Translation job {} failed: {}", job_id, message);
                emitter.emit(JobEvent::error(message.clone()));
                (JobState::Failed, JobOutcome::Failed(message))
            }
        };
        *self.state.lock() = state;
        outcome
    }

    async fn run(&self, config: &TranslationConfig, emitter: &Emitter) -> Result<RunEnd, JobError> {
        emitter.emit(JobEvent::progress(10, "Analyzing page content..."));

        let units = {
            let page = self.page.lock();
            let body = page
                .document
                .body()
                .ok_or_else(|| JobError::DocumentUnavailable("document has no body".to_string()))?;
            select_translatable_units(&page.document, body)
        };
        if units.is_empty() {
            warn!("No translatable content found");
            return Err(JobError::SelectionEmpty);
        }

        emitter.emit(JobEvent::progress(
            20,
            format!("Found {} elements to translate...", units.len()),
        ));

        let batches = make_batches(&units, self.batch_size);
        let total = batches.len();
        debug!("Created {} batches of size {}", total, self.batch_size);

        let applier = BatchApplier::new(self.translator.as_ref(), &self.page, &self.abort);
        for (completed, batch) in batches.iter().enumerate() {
            if self.abort_requested() {
                return Ok(RunEnd::Aborted);
            }

            let report = applier.apply_batch(batch, config).await;
            if report.outcome == BatchOutcome::Aborted || self.abort_requested() {
                return Ok(RunEnd::Aborted);
            }
            if let BatchOutcome::Failed(reason) = &report.outcome {
                warn!("Skipping batch {} of {}: {}", batch.index + 1, total, reason);
            }

            let done = completed + 1;
            emitter.emit(JobEvent::progress(
                progress_percent(done, total),
                format!("Translated {} of {} batches...", done, total),
            ));
        }

        Ok(RunEnd::Finished)
    }

    fn abort_requested(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }

    /// Ask the running job to stop at its next check point.
    ///
    /// Idempotent and a no-op when nothing is running. The in-flight request,
    /// if any, is allowed to finish but its result is discarded.
    pub fn abort(&self) {
        if !self.is_running() {
            return;
        }
        self.abort.store(true, Ordering::SeqCst);
        let mut state = self.state.lock();
        if *state == JobState::Running {
            *state = JobState::Aborting;
        }
        info!("Abort requested");
    }

    /// Restore every translated node and clear the undo log; safe at any time
    pub fn revert(&self) -> RevertSummary {
        let summary = self.page.lock().revert();
        info!(
            "Reverted {} nodes and cleared {} markers",
            summary.restored_nodes, summary.cleared_markers
        );
        summary
    }

    /// Run `f` with read access to the page
    pub fn with_page<R>(&self, f: impl FnOnce(&PageState) -> R) -> R {
        f(&self.page.lock())
    }

    /// Serialize the current document
    pub fn document_html(&self) -> String {
        self.page.lock().document.to_html()
    }

    /// Identifier the next job will receive
    pub fn next_job_id(&self) -> JobId {
        self.next_job_id.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for JobController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobController")
            .field("translator", &self.translator)
            .field("state", &self.state())
            .field("running", &self.is_running())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}
