//! Trigger configuration: load, save, edit and resolve.

mod config;

pub use config::{ConfigError, TriggerConfigExt, load_triggers, save_triggers};
