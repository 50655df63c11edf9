//! Respawn timers started by kills.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use super::countdown::Countdown;
use crate::events::{EventHandler, EventKind, GameEvent, HandlerError};
use crate::state::CurrentZone;

const INTERESTS: &[EventKind] = &[EventKind::Kill, EventKind::ZoneChange];

/// One row of a [`TimerBoard`] snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerEntry {
    /// `<subject>_<timestamp_millis>`
    pub key: String,
    pub subject: String,
    /// `<subject> - M:SS`
    pub label: String,
    pub remaining_secs: u64,
    pub progress: f32,
}

#[derive(Debug, Default)]
struct BoardState {
    /// Start order
    timers: Vec<(String, Countdown)>,
    identity: Option<String>,
    zone: Option<CurrentZone>,
}

/// Respawn countdowns keyed by kill.
///
/// Clones share the same board, so a display can read snapshots while the
/// dispatcher owns the registered clone.
#[derive(Debug, Clone)]
pub struct TimerBoard {
    state: Arc<Mutex<BoardState>>,
    enabled: Arc<AtomicBool>,
}

impl Default for TimerBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerBoard {
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn start_timer_at(&self, key: String, subject: &str, respawn_secs: u64, now: Instant) {
        tracing::debug!(%key, respawn_secs, "Starting respawn timer");
        let mut state = self.lock();
        state.timers.retain(|(k, _)| *k != key);
        state
            .timers
            .push((key, Countdown::start(subject, respawn_secs, now)));
    }

    /// Remove one timer. Returns false if it was not running.
    pub fn remove(&self, key: &str) -> bool {
        let mut state = self.lock();
        let before = state.timers.len();
        state.timers.retain(|(k, _)| k != key);
        state.timers.len() != before
    }

    pub fn clear(&self) {
        self.lock().timers.clear();
    }

    /// Running timers in start order. Expired timers are dropped.
    pub fn snapshot(&self, now: Instant) -> Vec<TimerEntry> {
        let mut state = self.lock();
        state.timers.retain(|(_, c)| !c.is_expired(now));
        state
            .timers
            .iter()
            .map(|(key, countdown)| TimerEntry {
                key: key.clone(),
                subject: countdown.label.clone(),
                label: format!("{} - {}", countdown.label, countdown.remaining_text(now)),
                remaining_secs: countdown.remaining(now).as_secs_f32().ceil() as u64,
                progress: countdown.progress(now),
            })
            .collect()
    }

    pub fn identity(&self) -> Option<String> {
        self.lock().identity.clone()
    }

    pub fn zone(&self) -> Option<CurrentZone> {
        self.lock().zone.clone()
    }

    /// `<identity> | Zone: <who name> (M:SS)`, either part may be missing
    pub fn header(&self) -> String {
        let state = self.lock();
        let identity = state.identity.as_deref().unwrap_or("No log");
        match &state.zone {
            Some(zone) => format!("{} | {}", identity, zone.display()),
            None => identity.to_string(),
        }
    }
}

impl EventHandler for TimerBoard {
    fn name(&self) -> &str {
        "timers"
    }

    fn interests(&self) -> &[EventKind] {
        INTERESTS
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn handle_event(&mut self, event: &GameEvent) -> Result<(), HandlerError> {
        match event {
            GameEvent::Kill {
                subject,
                respawn_secs,
                ..
            } => {
                let key = event
                    .kill_key()
                    .ok_or_else(|| HandlerError::Failed("kill without key".to_string()))?;
                self.start_timer_at(key, subject, *respawn_secs, Instant::now());
            }
            GameEvent::ZoneChanged { zone, respawn_secs } => {
                self.lock().zone = Some(CurrentZone {
                    name: zone.clone(),
                    respawn_secs: *respawn_secs,
                });
            }
            GameEvent::TriggerMatched { .. } => {}
        }
        Ok(())
    }

    fn on_source_reattached(&mut self, label: &str) {
        let mut state = self.lock();
        if state.identity.as_deref() != Some(label) {
            state.zone = None;
        }
        state.identity = Some(label.to_string());
    }
}
