/*!
 * Job lifecycle events and the sinks that receive them.
 */

use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Identifier of one `start` call
pub type JobId = u64;

/// Something the UI collaborator needs to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JobEvent {
    Progress { percent: u8, message: String },
    Complete { percent: u8 },
    Error { message: String },
}

impl JobEvent {
    pub fn progress(percent: u8, message: impl Into<String>) -> Self {
        Self::Progress {
            percent: percent.min(100),
            message: message.into(),
        }
    }

    pub fn complete() -> Self {
        Self::Complete { percent: 100 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Complete and Error end a job
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }

    pub fn percent(&self) -> Option<u8> {
        match self {
            Self::Progress { percent, .. } | Self::Complete { percent } => Some(*percent),
            Self::Error { .. } => None,
        }
    }
}

/// An event stamped with its job and its position within that job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMessage {
    pub job_id: JobId,
    /// Starts at 0 for every job
    pub sequence: u64,
    pub event: JobEvent,
}

/// Receiver of job messages, called synchronously from the job loop
pub trait EventSink: Send + Sync {
    fn emit(&self, message: JobMessage);
}

impl<F> EventSink for F
where
    F: Fn(JobMessage) + Send + Sync,
{
    fn emit(&self, message: JobMessage) {
        self(message)
    }
}

/// Forwards messages into an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<JobMessage>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<JobMessage>) -> Self {
        Self { tx }
    }

    /// A sink together with the receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<JobMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, message: JobMessage) {
        // A dropped receiver just means nobody is watching
        let _ = self.tx.send(message);
    }
}

/// Writes messages to the log, used when no UI is attached
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, message: JobMessage) {
        match &message.event {
            JobEvent::Progress { percent, message: text } => {
                info!("[job {}] {}% {}", message.job_id, percent, text)
            }
            JobEvent::Complete { .. } => info!("[job {}] Translation complete", message.job_id),
            JobEvent::Error { message: text } => error!("[job {}] {}", message.job_id, text),
        }
    }
}

/// Stamps events of a single job before handing them to the sink
pub(crate) struct Emitter {
    job_id: JobId,
    sequence: AtomicU64,
    sink: Arc<dyn EventSink>,
}

impl Emitter {
    pub(crate) fn new(job_id: JobId, sink: Arc<dyn EventSink>) -> Self {
        Self {
            job_id,
            sequence: AtomicU64::new(0),
            sink,
        }
    }

    pub(crate) fn emit(&self, event: JobEvent) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.sink.emit(JobMessage {
            job_id: self.job_id,
            sequence,
            event,
        });
    }
}
