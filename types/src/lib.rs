//! Shared configuration types for eqtrak.
//!
//! Everything in this crate is plain data: serde-serializable trigger
//! definitions and the small formatting helpers used by every consumer.

pub mod formatting;
mod triggers;

pub use triggers::{
    DEFAULT_OVERLAY_DURATION_SECS, IdentityProfile, OverlayDefinition, TriggerConfig,
    TriggerPayload, VoiceTrigger,
};
