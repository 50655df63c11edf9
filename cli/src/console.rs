use std::io::Write;

use eqtrak_core::events::{EventHandler, EventKind, GameEvent, HandlerError};
use eqtrak_types::TriggerPayload;
use eqtrak_types::formatting::format_duration;

const INTERESTS: &[EventKind] = &[EventKind::Kill, EventKind::ZoneChange, EventKind::Trigger];

/// Prints every event to stdout as it is dispatched.
#[derive(Debug, Default)]
pub struct ConsolePrinter;

impl ConsolePrinter {
    fn print(&self, line: std::fmt::Arguments<'_>) -> Result<(), HandlerError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}").map_err(|e| HandlerError::Failed(e.to_string()))
    }
}

impl EventHandler for ConsolePrinter {
    fn name(&self) -> &str {
        "console"
    }

    fn interests(&self) -> &[EventKind] {
        INTERESTS
    }

    fn handle_event(&mut self, event: &GameEvent) -> Result<(), HandlerError> {
        match event {
            GameEvent::Kill {
                subject,
                respawn_secs,
                ..
            } => self.print(format_args!(
                "Killed {} (respawn {})",
                subject,
                format_duration(*respawn_secs)
            )),
            GameEvent::ZoneChanged { zone, respawn_secs } => self.print(format_args!(
                "Entered {} (respawn {})",
                zone,
                format_duration(*respawn_secs)
            )),
            GameEvent::TriggerMatched { pattern, payload } => match payload {
                TriggerPayload::Speech { text } => {
                    self.print(format_args!("Trigger {pattern:?}: say {text:?}"))
                }
                TriggerPayload::Overlay {
                    message,
                    duration_secs,
                } => self.print(format_args!(
                    "Trigger {:?}: {} for {}",
                    pattern,
                    message,
                    format_duration(u64::from(*duration_secs))
                )),
            },
        }
    }

    fn on_source_reattached(&mut self, label: &str) {
        let _ = self.print(format_args!("Now tailing {label}"));
    }
}
