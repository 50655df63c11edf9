pub mod context;
pub mod events;
pub mod game_data;
pub mod handlers;
pub mod log;
pub mod state;
pub mod tracking;

// Re-exports for convenience
pub use context::{AppConfig, SessionConfig, SourceIdentity, TailSession, select_active_source};
pub use events::{EventHandler, EventKind, GameEvent, classify};
pub use log::*;
pub use state::{SessionState, TriggerSet};
pub use tracking::{ConfigError, TriggerConfigExt};
