use std::time::{Duration, Instant};

use eqtrak_types::formatting::format_countdown;

/// A running countdown shared by the timer board and overlay bars.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Countdown {
    pub label: String,
    pub total: Duration,
    pub expires_at: Instant,
}

impl Countdown {
    pub fn start(label: impl Into<String>, secs: u64, now: Instant) -> Self {
        let total = Duration::from_secs(secs);
        Self {
            label: label.into(),
            total,
            expires_at: now + total,
        }
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Fraction left, 1.0 when just started and 0.0 once expired
    pub fn progress(&self, now: Instant) -> f32 {
        if self.total.is_zero() {
            return 0.0;
        }
        (self.remaining(now).as_secs_f32() / self.total.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Remaining time as `M:SS`, rounded up
    pub fn remaining_text(&self, now: Instant) -> String {
        format_countdown(self.remaining(now).as_secs_f32(), "0:00")
    }
}
