use serde::{Deserialize, Serialize};

/// Overlay bar length used when a definition omits `duration_secs`.
pub const DEFAULT_OVERLAY_DURATION_SECS: u32 = 60;

/// What a matched trigger pattern asks its consumers to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerPayload {
    /// Text handed to the speech backend
    Speech { text: String },
    /// Countdown bar shown on the overlay
    Overlay { message: String, duration_secs: u32 },
}

/// A global ("master") spoken alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceTrigger {
    /// Literal, case-sensitive substring of a normalized log line
    pub pattern: String,
    pub text: String,
}

/// A master-list overlay bar definition. Only fires for identities whose
/// profile subscribes to its pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayDefinition {
    pub pattern: String,
    pub message: String,
    #[serde(default = "default_overlay_duration")]
    pub duration_secs: u32,
}

fn default_overlay_duration() -> u32 {
    DEFAULT_OVERLAY_DURATION_SECS
}

/// Per-identity overlay subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub identity: String,
    /// Patterns from the overlay master list
    #[serde(default)]
    pub overlays: Vec<String>,
}

/// The persisted trigger file.
///
/// Lists are ordered; the order is the order patterns are tested in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default, rename = "voice")]
    pub voice: Vec<VoiceTrigger>,
    #[serde(default, rename = "overlay")]
    pub overlays: Vec<OverlayDefinition>,
    #[serde(default, rename = "profile")]
    pub profiles: Vec<IdentityProfile>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            voice: vec![
                VoiceTrigger {
                    pattern: "Your root has broken".to_string(),
                    text: "Root has broken!".to_string(),
                },
                VoiceTrigger {
                    pattern: " resists your spell".to_string(),
                    text: "Spell resisted!".to_string(),
                },
            ],
            overlays: vec![OverlayDefinition {
                pattern: "You activate Stone Stance.".to_string(),
                message: "Stone Stance".to_string(),
                duration_secs: 480,
            }],
            profiles: Vec::new(),
        }
    }
}

impl TriggerConfig {
    /// A config with no triggers at all (the default ships a few examples).
    pub fn empty() -> Self {
        Self {
            voice: Vec::new(),
            overlays: Vec::new(),
            profiles: Vec::new(),
        }
    }

    pub fn overlay(&self, pattern: &str) -> Option<&OverlayDefinition> {
        self.overlays.iter().find(|o| o.pattern == pattern)
    }

    pub fn profile(&self, identity: &str) -> Option<&IdentityProfile> {
        self.profiles.iter().find(|p| p.identity == identity)
    }

    pub fn is_empty(&self) -> bool {
        self.voice.is_empty() && self.overlays.is_empty() && self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trigger_toml() {
        let toml = r#"
[[voice]]
pattern = "Your root has broken"
text = "Root has broken!"

[[overlay]]
pattern = "You activate Stone Stance."
message = "Stone Stance"
duration_secs = 480

[[overlay]]
pattern = "You feel yourself starting to appear."
message = "Invis fading"

[[profile]]
identity = "Bort"
overlays = ["You activate Stone Stance."]
"#;

        let config: TriggerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.voice.len(), 1);
        assert_eq!(config.overlays.len(), 2);
        assert_eq!(config.overlays[1].duration_secs, DEFAULT_OVERLAY_DURATION_SECS);
        assert_eq!(
            config.profile("Bort").map(|p| p.overlays.len()),
            Some(1)
        );
        assert!(config.profile("Grimm").is_none());
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let config: TriggerConfig = toml::from_str("").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_payload_tagging() {
        let payload: TriggerPayload =
            toml::from_str("type = \"overlay\"\nmessage = \"Root\"\nduration_secs = 30").unwrap();
        assert_eq!(
            payload,
            TriggerPayload::Overlay {
                message: "Root".to_string(),
                duration_secs: 30
            }
        );
    }
}
