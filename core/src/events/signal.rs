use eqtrak_types::TriggerPayload;

/// Events extracted from normalized log lines.
/// At most one is produced per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// "You have slain X!" or "X has been slain by ..."
    Kill {
        subject: String,
        /// Unique per session; only used to build [`GameEvent::kill_key`]
        timestamp_millis: i64,
        /// Resolved from the override, the current zone, or the fallback
        respawn_secs: u64,
    },

    /// The canonical zone differs from the previously tracked one
    ZoneChanged { zone: String, respawn_secs: u64 },

    /// A configured substring pattern occurred in the line
    TriggerMatched {
        pattern: String,
        payload: TriggerPayload,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Kill,
    ZoneChange,
    Trigger,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::Kill { .. } => EventKind::Kill,
            GameEvent::ZoneChanged { .. } => EventKind::ZoneChange,
            GameEvent::TriggerMatched { .. } => EventKind::Trigger,
        }
    }

    /// `<subject>_<timestamp_millis>` for kills
    pub fn kill_key(&self) -> Option<String> {
        match self {
            GameEvent::Kill {
                subject,
                timestamp_millis,
                ..
            } => Some(format!("{}_{}", subject, timestamp_millis)),
            _ => None,
        }
    }
}
