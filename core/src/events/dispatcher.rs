use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use super::{EventHandler, GameEvent};

/// Token returned by [`EventDispatcher::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct Registration {
    id: HandlerId,
    handler: Box<dyn EventHandler>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Delivers events to registered handlers in registration order.
///
/// A handler that errors or panics is logged and skipped; the remaining
/// handlers still receive the event.
#[derive(Default)]
pub struct EventDispatcher {
    registrations: Vec<Registration>,
    next_id: u64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Box<dyn EventHandler>) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        tracing::info!(handler = handler.name(), "Registered event handler");
        self.registrations.push(Registration { id, handler });
        id
    }

    pub fn unregister(&mut self, id: HandlerId) -> Option<Box<dyn EventHandler>> {
        let idx = self.registrations.iter().position(|r| r.id == id)?;
        let registration = self.registrations.remove(idx);
        tracing::info!(handler = registration.handler.name(), "Unregistered event handler");
        Some(registration.handler)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn dispatch(&mut self, event: &GameEvent) -> DispatchReport {
        let kind = event.kind();
        let mut report = DispatchReport::default();

        for registration in &mut self.registrations {
            let handler = &mut registration.handler;
            if !handler.is_enabled() || !handler.wants(kind) {
                continue;
            }

            match catch_unwind(AssertUnwindSafe(|| handler.handle_event(event))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    tracing::warn!(handler = handler.name(), error = %e, ?kind, "Event handler failed");
                }
                Err(panic) => {
                    report.failed += 1;
                    tracing::error!(
                        handler = handler.name(),
                        panic = panic_message(panic.as_ref()),
                        ?kind,
                        "Event handler panicked"
                    );
                }
            }
        }

        report
    }

    /// Tell every handler which identity is now being tailed. Disabled
    /// handlers are told too, so they are current when re-enabled.
    pub fn notify_reattached(&mut self, label: &str) {
        for registration in &mut self.registrations {
            let handler = &mut registration.handler;
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler.on_source_reattached(label))) {
                tracing::error!(
                    handler = handler.name(),
                    panic = panic_message(panic.as_ref()),
                    "Re-attach hook panicked"
                );
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic>")
}
