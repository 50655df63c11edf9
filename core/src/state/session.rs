use eqtrak_types::formatting::{format_duration, parse_clock_duration};

use super::TriggerSet;
use crate::game_data::{NO_ZONE_RESPAWN_SECS, who_name};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentZone {
    /// Canonical (zone entry) name
    pub name: String,
    pub respawn_secs: u64,
}

impl CurrentZone {
    /// `Zone: <who name> (M:SS)`
    pub fn display(&self) -> String {
        format!(
            "Zone: {} ({})",
            who_name(&self.name),
            format_duration(self.respawn_secs)
        )
    }
}

/// Mutable state threaded through classification.
///
/// Only the poll tick writes to it; consumers see events, never this.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    identity: Option<String>,
    current_zone: Option<CurrentZone>,
    respawn_override: Option<String>,
    triggers: TriggerSet,
    last_kill_millis: i64,
}

impl SessionState {
    pub fn new(triggers: TriggerSet) -> Self {
        Self {
            triggers,
            ..Self::default()
        }
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Switch to a new identity. A different label forgets the zone.
    pub fn set_identity(&mut self, label: &str) {
        if self.identity.as_deref() != Some(label) {
            self.current_zone = None;
            self.identity = Some(label.to_string());
        }
    }

    pub fn current_zone(&self) -> Option<&CurrentZone> {
        self.current_zone.as_ref()
    }

    /// Record `zone` as current. Returns false when it already was.
    pub fn enter_zone(&mut self, name: &str, respawn_secs: u64) -> bool {
        if self.current_zone.as_ref().is_some_and(|z| z.name == name) {
            return false;
        }
        self.current_zone = Some(CurrentZone {
            name: name.to_string(),
            respawn_secs,
        });
        true
    }

    pub fn respawn_override(&self) -> Option<&str> {
        self.respawn_override.as_deref()
    }

    pub fn set_respawn_override(&mut self, text: Option<String>) {
        self.respawn_override = text;
    }

    /// Respawn for a fresh kill: a valid override, else the zone default,
    /// else the no-zone fallback.
    pub fn kill_respawn_secs(&self) -> u64 {
        self.respawn_override
            .as_deref()
            .and_then(parse_clock_duration)
            .or_else(|| self.current_zone.as_ref().map(|z| z.respawn_secs))
            .unwrap_or(NO_ZONE_RESPAWN_SECS)
    }

    pub fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    pub fn set_triggers(&mut self, triggers: TriggerSet) {
        self.triggers = triggers;
    }

    /// Strictly increasing millisecond stamp so kill keys never collide.
    pub(crate) fn next_kill_millis(&mut self, now_millis: i64) -> i64 {
        let stamp = now_millis.max(self.last_kill_millis + 1);
        self.last_kill_millis = stamp;
        stamp
    }
}
