use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::tail_session::SessionConfig;
use crate::tracking::ConfigError;

pub const APP_NAME: &str = "eqtrak";
const CONFIG_NAME: &str = "config";
const TRIGGERS_FILE: &str = "triggers.toml";

/// Persisted application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_directory: PathBuf,
    /// Log files are `<filename_prefix><character>_<rest>`
    pub filename_prefix: String,
    pub poll_interval_ms: u64,
    /// Re-run source selection every N polls
    pub reselect_every: u32,
    /// User-entered `M:SS` respawn time; invalid text is ignored
    pub respawn_override: Option<String>,
    pub timers_enabled: bool,
    pub voice_enabled: bool,
    pub overlays_enabled: bool,
    /// Program and leading arguments; the text to speak is appended
    pub speech_command: Option<Vec<String>>,
    pub triggers_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_directory: default_log_directory(),
            filename_prefix: "eqlog_".to_string(),
            poll_interval_ms: 1000,
            reselect_every: 3,
            respawn_override: None,
            timers_enabled: true,
            voice_enabled: false,
            overlays_enabled: false,
            speech_command: None,
            triggers_file: None,
        }
    }
}

impl AppConfig {
    /// Load from the platform config directory, creating defaults on first run.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        Ok(confy::store(APP_NAME, CONFIG_NAME, self)?)
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?)
    }

    /// Explicit `triggers_file`, else `triggers.toml` beside the config file.
    pub fn triggers_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.triggers_file {
            return Some(path.clone());
        }
        Self::config_path()
            .ok()
            .and_then(|p| p.parent().map(|dir| dir.join(TRIGGERS_FILE)))
            .or_else(|| dirs::config_dir().map(|p| p.join(APP_NAME).join(TRIGGERS_FILE)))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            log_directory: self.log_directory.clone(),
            filename_prefix: self.filename_prefix.clone(),
            reselect_every: self.reselect_every.max(1),
        }
    }

    /// Set the log directory after checking it is usable.
    pub fn set_log_directory(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.log_directory = validate_log_directory(path)?;
        Ok(())
    }
}

/// Resolve a user-chosen log directory, failing with an actionable message.
pub fn validate_log_directory(path: &Path) -> Result<PathBuf, ConfigError> {
    let meta = std::fs::metadata(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(ConfigError::Invalid(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    std::fs::read_dir(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(path.to_path_buf())
}

fn default_log_directory() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("Games").join("everquest").join("Logs"))
        .unwrap_or_else(|| PathBuf::from("Logs"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_config_fills_defaults() {
        let config: AppConfig =
            toml::from_str("log_directory = \"/tmp/logs\"\nvoice_enabled = true").unwrap();
        assert_eq!(config.log_directory, PathBuf::from("/tmp/logs"));
        assert!(config.voice_enabled);
        assert_eq!(config.filename_prefix, "eqlog_");
        assert_eq!(config.reselect_every, 3);
        assert!(config.timers_enabled);
    }

    #[test]
    fn session_config_never_reselects_zero() {
        let config = AppConfig {
            reselect_every: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.session_config().reselect_every, 1);
    }

    #[test]
    fn rejects_unusable_directories() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        let mut config = AppConfig::default();
        assert!(matches!(
            config.set_log_directory(&dir.path().join("missing")),
            Err(ConfigError::Io { .. })
        ));
        assert!(matches!(
            config.set_log_directory(&file),
            Err(ConfigError::Invalid(_))
        ));
        config.set_log_directory(dir.path()).unwrap();
        assert_eq!(config.log_directory, dir.path());
    }

    #[test]
    fn explicit_triggers_file_wins() {
        let config = AppConfig {
            triggers_file: Some(PathBuf::from("/etc/eqtrak/t.toml")),
            ..AppConfig::default()
        };
        assert_eq!(config.triggers_path(), Some(PathBuf::from("/etc/eqtrak/t.toml")));
    }
}
