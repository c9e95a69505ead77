//! Configuration settings for the Cadence engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::ReminderChannel;
use crate::error::{ConfigError, Result};
use crate::reminders::DEFAULT_OFFSETS_MINUTES;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reminders: ReminderConfig,
    pub events: EventConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            PathBuf::from("cadence.toml"),
            dirs::config_dir()
                .map(|p| p.join("cadence/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.reminders.default_offsets_minutes.is_empty() {
            return Err(ConfigError::Invalid(
                "reminders.default_offsets_minutes must not be empty".to_string(),
            )
            .into());
        }
        if let Some(&offset) = self
            .reminders
            .default_offsets_minutes
            .iter()
            .find(|&&o| o <= 0)
        {
            return Err(ConfigError::Invalid(format!(
                "reminder offsets must be positive, got {offset}"
            ))
            .into());
        }
        if self.events.default_duration_minutes == 0 {
            return Err(ConfigError::Invalid(
                "events.default_duration_minutes must be > 0".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

/// Reminder scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Offsets applied when an event carries no explicit ones.
    pub default_offsets_minutes: Vec<i64>,
    /// Channel for default reminders.
    pub default_channel: ReminderChannel,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            default_offsets_minutes: DEFAULT_OFFSETS_MINUTES.to_vec(),
            default_channel: ReminderChannel::Notification,
        }
    }
}

/// Event shaping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Duration assumed for proposals without an explicit end time.
    pub default_duration_minutes: u32,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.reminders.default_offsets_minutes, vec![720, 30]);
        assert_eq!(config.events.default_duration_minutes, 60);
    }

    #[test]
    fn test_parse_overrides() {
        let config = Config::from_str(
            r#"
            [reminders]
            default_offsets_minutes = [60, 10]
            default_channel = "email"

            [events]
            default_duration_minutes = 45
            "#,
        )
        .unwrap();

        assert_eq!(config.reminders.default_offsets_minutes, vec![60, 10]);
        assert_eq!(config.reminders.default_channel, ReminderChannel::Email);
        assert_eq!(config.events.default_duration_minutes, 45);
    }

    #[test]
    fn test_rejects_non_positive_offsets() {
        let result = Config::from_str(
            r#"
            [reminders]
            default_offsets_minutes = [30, 0]
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cadence.toml");
        std::fs::write(&path, "[events]\ndefault_duration_minutes = 90\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.events.default_duration_minutes, 90);
    }
}
