use super::{EventKind, GameEvent};

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("handler worker is no longer running")]
    WorkerGone,
    #[error("{0}")]
    Failed(String),
}

/// A consumer of classified events.
///
/// Handlers are called synchronously on the poll tick and must return
/// quickly; anything slow belongs on the handler's own worker.
pub trait EventHandler: Send {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Event kinds this handler wants delivered
    fn interests(&self) -> &[EventKind];

    fn is_enabled(&self) -> bool {
        true
    }

    fn handle_event(&mut self, event: &GameEvent) -> Result<(), HandlerError>;

    /// Called after the tail re-attaches, with the new identity label.
    /// Disabled handlers are called as well.
    fn on_source_reattached(&mut self, _label: &str) {}

    fn wants(&self, kind: EventKind) -> bool {
        self.interests().contains(&kind)
    }
}
