/*!
 * Translation jobs.
 *
 * A `JobController` runs at most one job at a time over its page and reports
 * progress through an `EventSink`. Abort is cooperative: the flag is checked
 * at the top of each batch and around every request.
 */

pub use self::controller::{ABORT_MESSAGE, JobController, JobOutcome, JobState, progress_percent};
pub use self::events::{ChannelSink, EventSink, JobEvent, JobId, JobMessage, LogSink};

pub mod controller;
pub mod events;
