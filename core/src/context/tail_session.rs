//! The poll pipeline for one log directory.
//!
//! Each [`TailSession::tick`] runs selection (when due), reads new lines,
//! normalizes and classifies them, then dispatches the resulting events,
//! all synchronously and in file order.

use std::path::PathBuf;

use super::{SourceIdentity, select_active_source};
use crate::events::{EventDispatcher, EventHandler, GameEvent, HandlerId, classify};
use crate::log::{PollOutcome, TailCursor, normalize};
use crate::state::{SessionState, TriggerSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub log_directory: PathBuf,
    pub filename_prefix: String,
    /// Run selection every N ticks while attached
    pub reselect_every: u32,
}

impl SessionConfig {
    pub fn new(log_directory: impl Into<PathBuf>, filename_prefix: impl Into<String>) -> Self {
        Self {
            log_directory: log_directory.into(),
            filename_prefix: filename_prefix.into(),
            reselect_every: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Nothing attached yet
    Unattached,
    Attached,
    /// The handle was lost; the next tick re-selects
    Stale,
    /// Terminal
    Closed,
}

/// What a single tick did.
#[derive(Debug, Default)]
pub struct TickReport {
    pub lines_read: usize,
    /// Events dispatched this tick, in line order
    pub events: Vec<GameEvent>,
    /// Identity label, when the tick attached to a new file
    pub reattached: Option<String>,
    /// Handler invocations that errored or panicked
    pub failed_deliveries: usize,
}

pub struct TailSession {
    config: SessionConfig,
    cursor: TailCursor,
    state: SessionState,
    dispatcher: EventDispatcher,
    pipeline: PipelineState,
    ticks: u64,
    last_select_error: Option<String>,
}

impl TailSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            cursor: TailCursor::new(),
            state: SessionState::default(),
            dispatcher: EventDispatcher::new(),
            pipeline: PipelineState::Unattached,
            ticks: 0,
            last_select_error: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn pipeline_state(&self) -> PipelineState {
        self.pipeline
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The file currently being tailed
    pub fn source(&self) -> Option<&SourceIdentity> {
        self.cursor.identity()
    }

    pub fn identity(&self) -> Option<&str> {
        self.state.identity()
    }

    pub fn register(&mut self, handler: Box<dyn EventHandler>) -> HandlerId {
        self.dispatcher.register(handler)
    }

    pub fn unregister(&mut self, id: HandlerId) -> Option<Box<dyn EventHandler>> {
        self.dispatcher.unregister(id)
    }

    /// Replace the active trigger tables. Takes effect on the next line.
    pub fn set_triggers(&mut self, triggers: TriggerSet) {
        tracing::info!(rules = triggers.len(), "Trigger set replaced");
        self.state.set_triggers(triggers);
    }

    pub fn set_respawn_override(&mut self, text: Option<String>) {
        self.state.set_respawn_override(text);
    }

    /// Run one poll cycle. A closed session does nothing.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if self.pipeline == PipelineState::Closed {
            return report;
        }

        let due = !self.cursor.is_attached()
            || self.ticks % u64::from(self.config.reselect_every.max(1)) == 0;
        self.ticks += 1;
        if due {
            report.reattached = self.reselect();
        }

        if !self.cursor.is_attached() {
            return report;
        }

        match self.cursor.poll() {
            PollOutcome::Lines(lines) => {
                report.lines_read = lines.len();
                for raw in &lines {
                    self.process_line(raw, &mut report);
                }
            }
            PollOutcome::Detached => {
                self.pipeline = PipelineState::Stale;
            }
        }

        if report.lines_read > 0 {
            tracing::debug!(
                lines = report.lines_read,
                events = report.events.len(),
                "Poll complete"
            );
        }
        report
    }

    /// Release the file handle. Further ticks are no-ops.
    pub fn close(&mut self) {
        if self.pipeline == PipelineState::Closed {
            return;
        }
        self.cursor.detach();
        self.pipeline = PipelineState::Closed;
        tracing::info!("Tail session closed");
    }

    fn process_line(&mut self, raw: &str, report: &mut TickReport) {
        let Some(line) = normalize(raw) else {
            return;
        };
        let Some(event) = classify(line, &mut self.state) else {
            return;
        };
        tracing::debug!(?event, "Classified line");
        let delivery = self.dispatcher.dispatch(&event);
        report.failed_deliveries += delivery.failed;
        report.events.push(event);
    }

    /// Attach to the newest matching file if it differs from the current one.
    /// Returns the new identity label on re-attach.
    fn reselect(&mut self) -> Option<String> {
        let selected =
            match select_active_source(&self.config.log_directory, &self.config.filename_prefix) {
                Ok(identity) => {
                    self.last_select_error = None;
                    identity
                }
                Err(e) => {
                    let message = e.to_string();
                    if self.last_select_error.as_deref() == Some(message.as_str()) {
                        tracing::debug!(error = %e, "Log source still unavailable");
                    } else {
                        tracing::warn!(error = %e, "Log source unavailable, will retry");
                        self.last_select_error = Some(message);
                    }
                    return None;
                }
            };

        if self
            .cursor
            .identity()
            .is_some_and(|current| current.filename == selected.filename)
        {
            return None;
        }

        let label = selected.label.clone();
        match self.cursor.attach(selected) {
            Ok(_) => {
                self.pipeline = PipelineState::Attached;
                self.state.set_identity(&label);
                self.dispatcher.notify_reattached(&label);
                Some(label)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to attach to log file, will retry");
                if self.pipeline != PipelineState::Unattached {
                    self.pipeline = PipelineState::Stale;
                }
                None
            }
        }
    }
}
