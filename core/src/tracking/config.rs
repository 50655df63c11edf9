//! Trigger file persistence and editing.
//!
//! The trigger file is plain TOML owned by the user; the core only loads
//! it, applies edits, and resolves it into a runtime [`TriggerSet`].

use std::fs;
use std::path::{Path, PathBuf};

use eqtrak_types::{IdentityProfile, OverlayDefinition, TriggerConfig, TriggerPayload, VoiceTrigger};

use crate::state::{TriggerRule, TriggerSet};

/// Errors from configuration and trigger files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error for {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("serialize error for {path:?}: {source}")]
    Serialize {
        path: PathBuf,
        source: toml::ser::Error,
    },
    #[error("{0}")]
    Invalid(String),
    #[error("config store error: {0}")]
    Store(#[from] confy::ConfyError),
}

/// Load the trigger file. A missing file yields the built-in defaults.
pub fn load_triggers(path: &Path) -> Result<TriggerConfig, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No trigger file, using defaults");
            return Ok(TriggerConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let config: TriggerConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        voice = config.voice.len(),
        overlays = config.overlays.len(),
        profiles = config.profiles.len(),
        "Loaded trigger file"
    );
    Ok(config)
}

/// Write the trigger file, creating its directory if needed.
pub fn save_triggers(path: &Path, config: &TriggerConfig) -> Result<(), ConfigError> {
    let contents = toml::to_string_pretty(config).map_err(|source| ConfigError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, contents).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Validated edits on a [`TriggerConfig`].
///
/// Inputs are trimmed before use. Adding an existing pattern replaces it in
/// place so list order is kept.
pub trait TriggerConfigExt {
    fn add_voice(&mut self, pattern: &str, text: &str) -> Result<(), ConfigError>;
    fn remove_voice(&mut self, pattern: &str) -> Result<(), ConfigError>;
    fn add_overlay(&mut self, pattern: &str, message: &str, duration_secs: u32)
    -> Result<(), ConfigError>;
    /// Also drops the pattern from every profile.
    fn remove_overlay(&mut self, pattern: &str) -> Result<(), ConfigError>;
    fn add_profile(&mut self, identity: &str) -> Result<(), ConfigError>;
    fn remove_profile(&mut self, identity: &str) -> Result<(), ConfigError>;
    fn subscribe(&mut self, identity: &str, pattern: &str) -> Result<(), ConfigError>;
    fn unsubscribe(&mut self, identity: &str, pattern: &str) -> Result<(), ConfigError>;

    /// Build runtime tables: voice triggers are global, overlays are scoped
    /// to the identities that subscribe to them.
    fn resolve(&self) -> TriggerSet;
}

fn required<'a>(value: &'a str, what: &str) -> Result<&'a str, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Invalid(format!("{what} must not be empty")));
    }
    Ok(value)
}

impl TriggerConfigExt for TriggerConfig {
    fn add_voice(&mut self, pattern: &str, text: &str) -> Result<(), ConfigError> {
        let pattern = required(pattern, "pattern")?;
        let text = required(text, "spoken text")?;
        let trigger = VoiceTrigger {
            pattern: pattern.to_string(),
            text: text.to_string(),
        };
        match self.voice.iter_mut().find(|v| v.pattern == pattern) {
            Some(existing) => *existing = trigger,
            None => self.voice.push(trigger),
        }
        Ok(())
    }

    fn remove_voice(&mut self, pattern: &str) -> Result<(), ConfigError> {
        let pattern = pattern.trim();
        let before = self.voice.len();
        self.voice.retain(|v| v.pattern != pattern);
        if self.voice.len() == before {
            return Err(ConfigError::Invalid(format!(
                "no voice trigger with pattern {pattern:?}"
            )));
        }
        Ok(())
    }

    fn add_overlay(
        &mut self,
        pattern: &str,
        message: &str,
        duration_secs: u32,
    ) -> Result<(), ConfigError> {
        let pattern = required(pattern, "pattern")?;
        let message = required(message, "overlay message")?;
        if duration_secs == 0 {
            return Err(ConfigError::Invalid(
                "overlay duration must be greater than zero".to_string(),
            ));
        }
        let overlay = OverlayDefinition {
            pattern: pattern.to_string(),
            message: message.to_string(),
            duration_secs,
        };
        match self.overlays.iter_mut().find(|o| o.pattern == pattern) {
            Some(existing) => *existing = overlay,
            None => self.overlays.push(overlay),
        }
        Ok(())
    }

    fn remove_overlay(&mut self, pattern: &str) -> Result<(), ConfigError> {
        let pattern = pattern.trim();
        let before = self.overlays.len();
        self.overlays.retain(|o| o.pattern != pattern);
        if self.overlays.len() == before {
            return Err(ConfigError::Invalid(format!(
                "no overlay with pattern {pattern:?}"
            )));
        }
        for profile in &mut self.profiles {
            profile.overlays.retain(|p| p != pattern);
        }
        Ok(())
    }

    fn add_profile(&mut self, identity: &str) -> Result<(), ConfigError> {
        let identity = required(identity, "identity")?;
        if self.profile(identity).is_some() {
            return Err(ConfigError::Invalid(format!(
                "profile {identity:?} already exists"
            )));
        }
        self.profiles.push(IdentityProfile {
            identity: identity.to_string(),
            overlays: Vec::new(),
        });
        Ok(())
    }

    fn remove_profile(&mut self, identity: &str) -> Result<(), ConfigError> {
        let identity = identity.trim();
        let before = self.profiles.len();
        self.profiles.retain(|p| p.identity != identity);
        if self.profiles.len() == before {
            return Err(ConfigError::Invalid(format!("no profile {identity:?}")));
        }
        Ok(())
    }

    fn subscribe(&mut self, identity: &str, pattern: &str) -> Result<(), ConfigError> {
        let identity = required(identity, "identity")?;
        let pattern = required(pattern, "pattern")?;
        if self.overlay(pattern).is_none() {
            return Err(ConfigError::Invalid(format!(
                "no overlay with pattern {pattern:?}"
            )));
        }
        let Some(profile) = self.profiles.iter_mut().find(|p| p.identity == identity) else {
            return Err(ConfigError::Invalid(format!("no profile {identity:?}")));
        };
        if !profile.overlays.iter().any(|p| p == pattern) {
            profile.overlays.push(pattern.to_string());
        }
        Ok(())
    }

    fn unsubscribe(&mut self, identity: &str, pattern: &str) -> Result<(), ConfigError> {
        let identity = identity.trim();
        let pattern = pattern.trim();
        let Some(profile) = self.profiles.iter_mut().find(|p| p.identity == identity) else {
            return Err(ConfigError::Invalid(format!("no profile {identity:?}")));
        };
        let before = profile.overlays.len();
        profile.overlays.retain(|p| p != pattern);
        if profile.overlays.len() == before {
            return Err(ConfigError::Invalid(format!(
                "{identity:?} is not subscribed to {pattern:?}"
            )));
        }
        Ok(())
    }

    fn resolve(&self) -> TriggerSet {
        let mut set = TriggerSet::new();

        for voice in &self.voice {
            set.push_global(TriggerRule::new(
                voice.pattern.clone(),
                TriggerPayload::Speech {
                    text: voice.text.clone(),
                },
            ));
        }

        for profile in &self.profiles {
            // Master-list order, not subscription order
            for overlay in &self.overlays {
                if !profile.overlays.contains(&overlay.pattern) {
                    continue;
                }
                set.push_scoped(
                    &profile.identity,
                    TriggerRule::new(
                        overlay.pattern.clone(),
                        TriggerPayload::Overlay {
                            message: overlay.message.clone(),
                            duration_secs: overlay.duration_secs,
                        },
                    ),
                );
            }
        }

        set
    }
}
