//! Countdown bars for overlay triggers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use eqtrak_types::TriggerPayload;

use super::countdown::Countdown;
use crate::events::{EventHandler, EventKind, GameEvent, HandlerError};

const INTERESTS: &[EventKind] = &[EventKind::Trigger];

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayBar {
    pub message: String,
    /// `<message> (M:SS)`
    pub label: String,
    /// Remaining over total, 0.0..=1.0
    pub progress: f32,
}

/// Active overlay bars. Clones share state.
#[derive(Debug, Clone)]
pub struct OverlayBars {
    bars: Arc<Mutex<Vec<Countdown>>>,
    enabled: Arc<AtomicBool>,
}

impl OverlayBars {
    pub fn new(enabled: bool) -> Self {
        Self {
            bars: Arc::default(),
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Countdown>> {
        self.bars.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_bar_at(&self, message: &str, duration_secs: u32, now: Instant) {
        tracing::debug!(message, duration_secs, "Overlay bar started");
        self.lock()
            .push(Countdown::start(message, u64::from(duration_secs), now));
    }

    /// Bars still running, oldest first
    pub fn snapshot(&self, now: Instant) -> Vec<OverlayBar> {
        let mut bars = self.lock();
        bars.retain(|bar| !bar.is_expired(now));
        bars.iter()
            .map(|bar| OverlayBar {
                message: bar.label.clone(),
                label: format!("{} ({})", bar.label, bar.remaining_text(now)),
                progress: bar.progress(now),
            })
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl EventHandler for OverlayBars {
    fn name(&self) -> &str {
        "overlay"
    }

    fn interests(&self) -> &[EventKind] {
        INTERESTS
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn handle_event(&mut self, event: &GameEvent) -> Result<(), HandlerError> {
        if let GameEvent::TriggerMatched {
            payload:
                TriggerPayload::Overlay {
                    message,
                    duration_secs,
                },
            ..
        } = event
        {
            self.add_bar_at(message, *duration_secs, Instant::now());
        }
        Ok(())
    }
}
