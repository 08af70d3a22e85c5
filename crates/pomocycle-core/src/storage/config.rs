//! TOML-based session configuration.
//!
//! Stores the cycle durations and the flags the session controller needs
//! across restarts:
//! - Work, short-break and long-break lengths in minutes
//! - `session_ended`, the durable "work finished, not restarted" flag
//! - `reset_requested`, the transient reset intent
//! - `phase`, the last phase the controller entered
//!
//! Configuration is stored at `~/.config/pomocycle/config.toml`.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigError, ValidationError};
use crate::timer::Phase;

/// Keys accepted by [`Config::get`] and [`Config::set`].
pub const SETTABLE_KEYS: [&str; 3] = ["work_minutes", "short_break_minutes", "long_break_minutes"];

/// Session configuration.
///
/// Every field has a serde default, so a partial or empty document merges
/// over [`Config::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_work_minutes", deserialize_with = "lenient_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_short_break_minutes", deserialize_with = "lenient_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes", deserialize_with = "lenient_minutes")]
    pub long_break_minutes: u32,
    #[serde(default)]
    pub reset_requested: bool,
    #[serde(default)]
    pub session_ended: bool,
    #[serde(default)]
    pub phase: Phase,
}

fn default_work_minutes() -> u32 {
    25
}
fn default_short_break_minutes() -> u32 {
    5
}
fn default_long_break_minutes() -> u32 {
    15
}

/// Reads a duration without failing the whole document.
///
/// Negative, out-of-range or non-integer values come back as 0, which
/// [`Config::sanitized`] then replaces with the field default.
fn lenient_minutes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = toml::Value::deserialize(deserializer)?;
    Ok(match value {
        toml::Value::Integer(n) => u32::try_from(n).unwrap_or(0),
        other => {
            tracing::warn!(value = %other, "duration in config is not a whole number");
            0
        }
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            reset_requested: false,
            session_ended: false,
            phase: Phase::Idle,
        }
    }
}

impl Config {
    /// Parse a TOML document, defaulting missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or a flag or
    /// phase has the wrong type. Bad durations are defaulted instead.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content)?;
        Ok(cfg.sanitized())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Replace non-positive durations with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        for (key, value, fallback) in [
            ("work_minutes", &mut self.work_minutes, defaults.work_minutes),
            (
                "short_break_minutes",
                &mut self.short_break_minutes,
                defaults.short_break_minutes,
            ),
            (
                "long_break_minutes",
                &mut self.long_break_minutes,
                defaults.long_break_minutes,
            ),
        ] {
            if *value == 0 {
                tracing::warn!(key, fallback, "non-positive duration in config, using default");
                *value = fallback;
            }
        }
        self
    }

    pub fn work_duration(&self) -> Duration {
        minutes(self.work_minutes)
    }

    pub fn short_break_duration(&self) -> Duration {
        minutes(self.short_break_minutes)
    }

    pub fn long_break_duration(&self) -> Duration {
        minutes(self.long_break_minutes)
    }

    /// Get a duration setting as string.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "work_minutes" => self.work_minutes,
            "short_break_minutes" => self.short_break_minutes,
            "long_break_minutes" => self.long_break_minutes,
            _ => return None,
        };
        Some(value.to_string())
    }

    /// Set a duration setting from user input.
    ///
    /// The prior value is kept when validation fails.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for keys outside
    /// [`SETTABLE_KEYS`] and [`ConfigError::InvalidValue`] when the value is
    /// not a positive whole number.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let slot = match key {
            "work_minutes" => &mut self.work_minutes,
            "short_break_minutes" => &mut self.short_break_minutes,
            "long_break_minutes" => &mut self.long_break_minutes,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        *slot = parse_minutes(value).map_err(|source| ConfigError::InvalidValue {
            key: key.to_string(),
            source,
        })?;
        Ok(())
    }
}

/// Parse a settings-field value as a positive number of minutes.
///
/// # Errors
///
/// Returns an error for non-numeric, zero or negative input.
pub fn parse_minutes(value: &str) -> Result<u32, ValidationError> {
    let trimmed = value.trim();
    let n: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))?;
    if n <= 0 {
        return Err(ValidationError::NonPositiveDuration(n));
    }
    u32::try_from(n).map_err(|_| ValidationError::NotANumber(trimmed.to_string()))
}

fn minutes(m: u32) -> Duration {
    Duration::from_secs(u64::from(m) * 60)
}
