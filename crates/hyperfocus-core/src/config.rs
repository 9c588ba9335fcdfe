//! TOML-based engine configuration.
//!
//! Stores the user-tunable knobs of the hyperfocus protection engine:
//! - Whether break suggestions are enabled at all
//! - The first-break threshold and escalation interval
//! - The maximum suggestion intensity the user is willing to see
//! - The display name used to personalize suggestion text
//!
//! Configuration is stored at `~/.config/hyperfocus/config.toml`.
//!
//! The fixed policy constants (natural-pause window, session-close grace,
//! cooldown, snooze window) live in [`policy`] and are deliberately not
//! user-configurable.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::suggestion::IntensityLevel;

/// Fixed policy constants of the engine.
///
/// These are part of the engine's behavioral contract rather than user
/// preferences, so they are plain constants instead of config fields.
pub mod policy {
    /// Minimum inactivity gap before a pause counts as a natural break point.
    pub const NATURAL_PAUSE_MIN_SECS: i64 = 8;
    /// Inactivity gap after which the focus session is closed.
    pub const SESSION_CLOSE_GRACE_SECS: i64 = 5 * 60;
    /// Minimum spacing between two emitted suggestions.
    pub const SUGGESTION_COOLDOWN_SECS: i64 = 2 * 60;
    /// How long a snooze suppresses further suggestions.
    pub const SNOOZE_SECS: i64 = 5 * 60;
    /// Period of the inactivity-close poll.
    pub const INACTIVITY_POLL_SECS: u64 = 1;
    /// Period of the suggestion-evaluation tick.
    pub const EVALUATION_TICK_SECS: u64 = 10;
}

/// Engine configuration.
///
/// Supplied once at engine construction and immutable for the engine's
/// lifetime. Serialized to/from TOML at `~/.config/hyperfocus/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Master switch for break suggestions. Session tracking runs regardless.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Session duration (minutes) at which the first gentle suggestion fires.
    #[serde(default = "default_first_break_threshold")]
    pub first_break_threshold_minutes: u32,
    /// Spacing (minutes) of the escalation ladder above the first threshold.
    #[serde(default = "default_escalation_interval")]
    pub escalation_interval_minutes: u32,
    /// Hardest intensity the engine is allowed to emit.
    #[serde(default = "default_max_intensity")]
    pub max_intensity: IntensityLevel,
    /// Display name for message personalization. Never used for logic.
    #[serde(default)]
    pub user_name: String,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_first_break_threshold() -> u32 {
    30
}
fn default_escalation_interval() -> u32 {
    15
}
fn default_max_intensity() -> IntensityLevel {
    IntensityLevel::Strong
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            first_break_threshold_minutes: default_first_break_threshold(),
            escalation_interval_minutes: default_escalation_interval(),
            max_intensity: IntensityLevel::Strong,
            user_name: String::new(),
        }
    }
}

impl EngineConfig {
    /// Clamp out-of-range values back to their defaults.
    ///
    /// Non-positive thresholds are replaced rather than rejected: the engine
    /// is a background convenience feature, and a broken config file must
    /// degrade to default behavior instead of refusing to run.
    pub fn normalized(mut self) -> Self {
        if self.first_break_threshold_minutes < 1 {
            self.first_break_threshold_minutes = default_first_break_threshold();
        }
        if self.escalation_interval_minutes < 1 {
            self.escalation_interval_minutes = default_escalation_interval();
        }
        self
    }

    /// Path to the config file (`~/.config/hyperfocus/config.toml`).
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hyperfocus")
            .join("config.toml")
    }

    /// Load from disk, falling back to defaults when the file is missing
    /// or unreadable. Always returns a normalized config.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load from an explicit path. Missing or malformed files yield defaults.
    pub fn load_from(path: &std::path::Path) -> Self {
        let config = std::fs::read_to_string(path)
            .ok()
            .and_then(|text| toml::from_str::<EngineConfig>(&text).ok())
            .unwrap_or_default();
        config.normalized()
    }

    /// Save to the default config path, creating parent directories.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path())
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, text).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// String accessor for the CLI `config get` command.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "enabled" => Some(self.enabled.to_string()),
            "first_break_threshold_minutes" => {
                Some(self.first_break_threshold_minutes.to_string())
            }
            "escalation_interval_minutes" => Some(self.escalation_interval_minutes.to_string()),
            "max_intensity" => Some(self.max_intensity.to_string()),
            "user_name" => Some(self.user_name.clone()),
            _ => None,
        }
    }

    /// String mutator for the CLI `config set` command. Saves on success.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "enabled" => {
                self.enabled = value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("expected true or false, got '{value}'"),
                })?;
            }
            "first_break_threshold_minutes" => {
                self.first_break_threshold_minutes = parse_minutes(key, value)?;
            }
            "escalation_interval_minutes" => {
                self.escalation_interval_minutes = parse_minutes(key, value)?;
            }
            "max_intensity" => {
                self.max_intensity =
                    value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("expected gentle, moderate or strong, got '{value}'"),
                    })?;
            }
            "user_name" => {
                self.user_name = value.to_string();
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        self.save()
    }
}

fn parse_minutes(key: &str, value: &str) -> Result<u32, ConfigError> {
    let minutes: u32 = value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected a positive integer, got '{value}'"),
    })?;
    if minutes < 1 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be >= 1".to_string(),
        });
    }
    Ok(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let config = EngineConfig::default();
        assert!(config.enabled);
        assert_eq!(config.first_break_threshold_minutes, 30);
        assert_eq!(config.escalation_interval_minutes, 15);
        assert_eq!(config.max_intensity, IntensityLevel::Strong);
    }

    #[test]
    fn normalized_clamps_zero_thresholds() {
        let config = EngineConfig {
            first_break_threshold_minutes: 0,
            escalation_interval_minutes: 0,
            ..Default::default()
        }
        .normalized();
        assert_eq!(config.first_break_threshold_minutes, 30);
        assert_eq!(config.escalation_interval_minutes, 15);
    }

    #[test]
    fn load_from_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_from(&dir.path().join("nope.toml"));
        assert_eq!(config.first_break_threshold_minutes, 30);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = EngineConfig {
            first_break_threshold_minutes: 45,
            max_intensity: IntensityLevel::Moderate,
            user_name: "Mika".to_string(),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = EngineConfig::load_from(&path);
        assert_eq!(loaded.first_break_threshold_minutes, 45);
        assert_eq!(loaded.max_intensity, IntensityLevel::Moderate);
        assert_eq!(loaded.user_name, "Mika");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: EngineConfig = toml::from_str("user_name = \"Aki\"").unwrap();
        assert!(config.enabled);
        assert_eq!(config.first_break_threshold_minutes, 30);
        assert_eq!(config.user_name, "Aki");
    }

    #[test]
    fn get_and_set_known_keys() {
        let mut config = EngineConfig::default();
        assert_eq!(config.get("enabled").as_deref(), Some("true"));
        assert_eq!(config.get("max_intensity").as_deref(), Some("strong"));
        assert!(config.get("unknown").is_none());

        // set() persists to disk, so only exercise the parse failures here.
        assert!(matches!(
            config.set("first_break_threshold_minutes", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }
}
