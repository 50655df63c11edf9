mod session;
mod triggers;

pub use session::{CurrentZone, SessionState};
pub use triggers::{TriggerRule, TriggerSet};
