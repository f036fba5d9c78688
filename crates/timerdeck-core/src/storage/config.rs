//! TOML-based application configuration.
//!
//! Stores user preferences:
//! - Default alert behavior for new countdown timers
//! - Watch-loop tick period
//!
//! Configuration is stored at `~/.config/timerdeck/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::alert::{AlertConfig, Repeat};
use crate::error::ConfigError;

use super::data_dir;

/// Default alert settings applied to countdown timers created without an
/// explicit configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDefaultsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 0 means repeat until acknowledged.
    #[serde(default = "default_repeat_count")]
    pub repeat_count: u32,
    #[serde(default = "default_wait_between_secs")]
    pub wait_between_secs: u64,
    /// `{timer name}` expands to the timer label.
    #[serde(default = "default_utterance_template")]
    pub utterance_template: String,
}

/// Watch-loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Seconds between ticks.
    #[serde(default = "default_tick_period_secs")]
    pub tick_period_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/timerdeck/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub alerts: AlertDefaultsConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_repeat_count() -> u32 {
    3
}
fn default_wait_between_secs() -> u64 {
    10
}
fn default_utterance_template() -> String {
    format!("{} is done", crate::alert::UTTERANCE_PLACEHOLDER)
}
fn default_tick_period_secs() -> u64 {
    1
}

impl Default for AlertDefaultsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            repeat_count: default_repeat_count(),
            wait_between_secs: default_wait_between_secs(),
            utterance_template: default_utterance_template(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            tick_period_secs: default_tick_period_secs(),
        }
    }
}

impl AlertDefaultsConfig {
    /// Per-timer alert configuration carrying these defaults.
    pub fn to_alert_config(&self) -> AlertConfig {
        AlertConfig {
            enabled: self.enabled,
            repeat: match self.repeat_count {
                0 => Repeat::Infinite,
                n => Repeat::Times(n),
            },
            wait_between_secs: self.wait_between_secs,
            utterance_template: self.utterance_template.clone(),
        }
    }
}

impl Config {
    /// Path of the configuration file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/timerdeck"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        let Ok(path) = Self::path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let text =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, text).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// String view of one config value, for the CLI.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "alerts.enabled" => Some(self.alerts.enabled.to_string()),
            "alerts.repeat_count" => Some(self.alerts.repeat_count.to_string()),
            "alerts.wait_between_secs" => Some(self.alerts.wait_between_secs.to_string()),
            "alerts.utterance_template" => Some(self.alerts.utterance_template.clone()),
            "watch.tick_period_secs" => Some(self.watch.tick_period_secs.to_string()),
            _ => None,
        }
    }

    /// Update one config value from its string form and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "alerts.enabled" => self.alerts.enabled = parse(key, value)?,
            "alerts.repeat_count" => self.alerts.repeat_count = parse(key, value)?,
            "alerts.wait_between_secs" => self.alerts.wait_between_secs = parse(key, value)?,
            "alerts.utterance_template" => self.alerts.utterance_template = value.to_string(),
            "watch.tick_period_secs" => {
                let period: u64 = parse(key, value)?;
                if period == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: "tick period must be at least 1 second".to_string(),
                    });
                }
                self.watch.tick_period_secs = period;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        self.save()
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("cannot parse '{value}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.alerts.enabled);
        assert_eq!(config.watch.tick_period_secs, 1);
    }

    #[test]
    fn partial_toml_fills_missing_fields() {
        let config: Config = toml::from_str(
            "[alerts]\nrepeat_count = 0\n",
        )
        .unwrap();
        assert_eq!(config.alerts.repeat_count, 0);
        assert_eq!(
            config.alerts.wait_between_secs,
            AlertDefaultsConfig::default().wait_between_secs
        );
    }

    #[test]
    fn zero_repeat_count_means_infinite() {
        let defaults = AlertDefaultsConfig {
            repeat_count: 0,
            ..Default::default()
        };
        assert_eq!(defaults.to_alert_config().repeat, Repeat::Infinite);
        let defaults = AlertDefaultsConfig::default();
        assert_eq!(defaults.to_alert_config().repeat, Repeat::Times(3));
    }

    #[test]
    fn get_and_set_roundtrip_in_memory() {
        let mut config = Config::default();
        assert_eq!(config.get("alerts.enabled").unwrap(), "true");
        assert!(config.get("nope").is_none());

        // set() persists; route it to a scratch directory.
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("TIMERDECK_DATA_DIR", dir.path());
        config.set("alerts.repeat_count", "5").unwrap();
        assert_eq!(config.alerts.repeat_count, 5);
        assert!(matches!(
            config.set("watch.tick_period_secs", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        std::env::remove_var("TIMERDECK_DATA_DIR");
    }

    #[test]
    fn toml_roundtrip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
