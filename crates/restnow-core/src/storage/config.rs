//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Work and rest durations (absent until first-run setup)
//! - Alert preferences (terminal bell, desktop notification)
//! - Overlay appearance (fade, message)
//!
//! Configuration is stored at `~/.config/restnow/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::data_dir;
use crate::alert::AlertPolicy;
use crate::error::ConfigError;
use crate::overlay::DEFAULT_MESSAGE;
use crate::timer::CycleDurations;

/// The two named duration values. Either one missing means "unconfigured".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationsConfig {
    #[serde(default)]
    pub work_secs: Option<u32>,
    #[serde(default)]
    pub rest_secs: Option<u32>,
}

/// Alert configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub on_break_start: bool,
    #[serde(default)]
    pub on_break_end: bool,
    #[serde(default = "default_true")]
    pub terminal_bell: bool,
    #[serde(default = "default_true")]
    pub desktop_notification: bool,
}

/// Overlay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of frames in a fade; 0 disables the fade.
    #[serde(default = "default_fade_steps")]
    pub fade_steps: u32,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    #[serde(default = "default_message")]
    pub message: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/restnow/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub durations: DurationsConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

fn default_true() -> bool {
    true
}
fn default_fade_steps() -> u32 {
    8
}
fn default_frame_ms() -> u64 {
    40
}
fn default_message() -> String {
    DEFAULT_MESSAGE.into()
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            on_break_start: true,
            on_break_end: false,
            terminal_bell: true,
            desktop_notification: true,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fade_steps: default_fade_steps(),
            frame_ms: default_frame_ms(),
            message: default_message(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }
        key.split('.').try_fold(root, |current, part| current.get(part))
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut parent = &mut *root;
        if let Some(path) = parent_path {
            for part in path.split('.') {
                parent = parent.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = parent.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("expected true or false, got '{value}'")))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                    .into(),
            ),
            // Unset optional values take whatever the text looks like.
            serde_json::Value::Null => {
                if value.eq_ignore_ascii_case("none") {
                    serde_json::Value::Null
                } else if let Ok(n) = value.parse::<u64>() {
                    serde_json::Value::Number(n.into())
                } else if let Ok(b) = value.parse::<bool>() {
                    serde_json::Value::Bool(b)
                } else {
                    serde_json::Value::String(value.into())
                }
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                return Err(invalid("cannot replace a whole section".into()));
            }
            serde_json::Value::String(_) => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value has the wrong type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Configured durations, or `None` when unset or non-positive.
    pub fn durations(&self) -> Option<CycleDurations> {
        let work = self.durations.work_secs?;
        let rest = self.durations.rest_secs?;
        match CycleDurations::new(work, rest) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!(error = %e, "ignoring stored durations");
                None
            }
        }
    }

    pub fn set_durations(&mut self, durations: CycleDurations) {
        self.durations.work_secs = Some(durations.work_secs());
        self.durations.rest_secs = Some(durations.rest_secs());
    }

    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy {
            on_break_start: self.alerts.enabled && self.alerts.on_break_start,
            on_break_end: self.alerts.enabled && self.alerts.on_break_end,
        }
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }
}
