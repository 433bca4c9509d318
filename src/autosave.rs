//! Debounced autosave for the note open in the editor.
//!
//! There is no background thread: the scheduler only records a deadline and the event
//! loop polls it. Cancelling is overwriting the deadline, so a superseded timer can
//! never fire.

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::error::NoteResult;
use crate::store::NoteStore;

/// Anything a pending edit can be flushed into.
pub trait NoteSink {
    fn write_note(&self, id: &str, content: &str) -> NoteResult<()>;
}

impl NoteSink for NoteStore {
    fn write_note(&self, id: &str, content: &str) -> NoteResult<()> {
        self.write(id, content)
    }
}

/// At most one scheduled flush; each edit replaces the previous deadline.
#[derive(Debug, Clone)]
pub struct AutosaveScheduler {
    quiet_period: Duration,
    deadline: Option<Instant>,
}

impl AutosaveScheduler {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            deadline: None,
        }
    }

    pub fn on_edit(&mut self, now: Instant) {
        if self.deadline.is_some() {
            trace!("superseding pending autosave");
        }
        self.deadline = Some(now + self.quiet_period);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }
}

/// The editor buffer of the open note plus its timer. Exists only while editing.
#[derive(Debug, Clone)]
pub struct PendingEdit {
    id: String,
    buffer: String,
    scheduler: AutosaveScheduler,
}

impl PendingEdit {
    pub fn new(id: impl Into<String>, content: impl Into<String>, quiet_period: Duration) -> Self {
        Self {
            id: id.into(),
            buffer: content.into(),
            scheduler: AutosaveScheduler::new(quiet_period),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.buffer
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    pub fn on_edit(&mut self, content: impl Into<String>, now: Instant) {
        self.buffer = content.into();
        self.scheduler.on_edit(now);
    }

    /// Fires the scheduled flush once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant, sink: &impl NoteSink) -> bool {
        if !self.scheduler.is_due(now) {
            return false;
        }
        debug!(note = %self.id, "autosave quiet period elapsed");
        self.flush_now(sink)
    }

    /// Writes the latest buffer right away and clears any scheduled flush. Failures are
    /// logged and reported as `false`; the caller carries on either way.
    pub fn flush_now(&mut self, sink: &impl NoteSink) -> bool {
        self.scheduler.cancel();
        match sink.write_note(&self.id, &self.buffer) {
            Ok(()) => {
                debug!(note = %self.id, "autosave flushed");
                true
            }
            Err(e) => {
                warn!(note = %self.id, error = %e, "autosave failed");
                false
            }
        }
    }
}
