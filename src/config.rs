//! Heartbeat configuration.
//!
//! Loaded once at startup from environment variables (optionally seeded from
//! a `.env` file) or from a TOML document. There is no dynamic reload.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default heartbeat interval: 30 minutes.
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30 * 60;

/// Default channel used for proactive notifications.
pub const DEFAULT_PROACTIVE_CHANNEL: &str = "cli";

/// Configuration for the heartbeat scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatConfig {
    /// Workspace root holding `TODO.md` and `HEARTBEAT.md`.
    pub workspace: PathBuf,
    /// Time between ticks.
    pub interval: Duration,
    /// Whether the scheduler runs at all.
    pub enabled: bool,
    /// Whether pending TODO.md tasks wake the agent.
    pub proactive_enabled: bool,
    /// Channel proactive notifications are delivered to.
    pub proactive_channel: String,
    /// Chat proactive notifications are delivered to. Empty disables them.
    pub proactive_chat_id: String,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
            interval: Duration::from_secs(DEFAULT_HEARTBEAT_INTERVAL_SECS),
            enabled: true,
            proactive_enabled: false,
            proactive_channel: DEFAULT_PROACTIVE_CHANNEL.to_string(),
            proactive_chat_id: String::new(),
        }
    }
}

impl HeartbeatConfig {
    /// Create a config for the given workspace with default settings.
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            ..Self::default()
        }
    }

    /// Set the tick interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Enable or disable the scheduler.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Enable proactive notifications to the given channel and chat.
    pub fn with_proactive(
        mut self,
        channel: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        self.proactive_enabled = true;
        self.proactive_channel = channel.into();
        self.proactive_chat_id = chat_id.into();
        self
    }

    /// Whether a tick should attempt the proactive TODO.md notification.
    ///
    /// An empty chat id disables it regardless of `proactive_enabled`.
    pub fn proactive_active(&self) -> bool {
        self.proactive_enabled && !self.proactive_chat_id.is_empty()
    }

    /// Load configuration from the process environment.
    ///
    /// Reads `.env` first if present; real environment variables win.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let workspace = get("IRONBEAT_WORKSPACE")
            .map(PathBuf::from)
            .unwrap_or(defaults.workspace);

        let enabled = match get("HEARTBEAT_ENABLED") {
            Some(v) => parse_bool("HEARTBEAT_ENABLED", &v)?,
            None => defaults.enabled,
        };

        let interval = match get("HEARTBEAT_INTERVAL_SECS") {
            Some(v) => parse_interval("HEARTBEAT_INTERVAL_SECS", &v)?,
            None => defaults.interval,
        };

        let proactive_enabled = match get("HEARTBEAT_PROACTIVE_ENABLED") {
            Some(v) => parse_bool("HEARTBEAT_PROACTIVE_ENABLED", &v)?,
            None => defaults.proactive_enabled,
        };

        Ok(Self {
            workspace,
            interval,
            enabled,
            proactive_enabled,
            proactive_channel: get("HEARTBEAT_PROACTIVE_CHANNEL")
                .unwrap_or(defaults.proactive_channel),
            proactive_chat_id: get("HEARTBEAT_PROACTIVE_CHAT_ID")
                .unwrap_or(defaults.proactive_chat_id),
        })
    }

    /// Parse configuration from a TOML document.
    ///
    /// Every key is optional:
    ///
    /// ```toml
    /// workspace = "/home/me/agent"
    /// enabled = true
    /// interval_secs = 900
    /// proactive_enabled = true
    /// proactive_channel = "telegram"
    /// proactive_chat_id = "42"
    /// ```
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let file: HeartbeatFileConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let defaults = Self::default();

        let interval = match file.interval_secs {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    key: "interval_secs".to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.interval,
        };

        Ok(Self {
            workspace: file.workspace.unwrap_or(defaults.workspace),
            interval,
            enabled: file.enabled.unwrap_or(defaults.enabled),
            proactive_enabled: file.proactive_enabled.unwrap_or(defaults.proactive_enabled),
            proactive_channel: file.proactive_channel.unwrap_or(defaults.proactive_channel),
            proactive_chat_id: file.proactive_chat_id.unwrap_or(defaults.proactive_chat_id),
        })
    }
}

/// On-disk shape of the TOML config.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HeartbeatFileConfig {
    workspace: Option<PathBuf>,
    enabled: Option<bool>,
    interval_secs: Option<u64>,
    proactive_enabled: Option<bool>,
    proactive_channel: Option<String>,
    proactive_chat_id: Option<String>,
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}

fn parse_interval(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = value.trim().parse().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("must be a whole number of seconds: {}", e),
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = HeartbeatConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, HeartbeatConfig::default());
        assert_eq!(config.interval, Duration::from_secs(1800));
        assert!(config.enabled);
        assert!(!config.proactive_enabled);
        assert_eq!(config.proactive_channel, "cli");
        assert!(config.proactive_chat_id.is_empty());
        assert!(!config.proactive_active());
    }

    #[test]
    fn test_env_overrides() {
        let config = HeartbeatConfig::from_lookup(lookup(&[
            ("IRONBEAT_WORKSPACE", "/tmp/agent"),
            ("HEARTBEAT_ENABLED", "false"),
            ("HEARTBEAT_INTERVAL_SECS", "60"),
            ("HEARTBEAT_PROACTIVE_ENABLED", "yes"),
            ("HEARTBEAT_PROACTIVE_CHANNEL", "telegram"),
            ("HEARTBEAT_PROACTIVE_CHAT_ID", "42"),
        ]))
        .unwrap();

        assert_eq!(config.workspace, PathBuf::from("/tmp/agent"));
        assert!(!config.enabled);
        assert_eq!(config.interval, Duration::from_secs(60));
        assert!(config.proactive_active());
        assert_eq!(config.proactive_channel, "telegram");
        assert_eq!(config.proactive_chat_id, "42");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = HeartbeatConfig::from_lookup(lookup(&[
            ("HEARTBEAT_INTERVAL_SECS", "  "),
            ("HEARTBEAT_PROACTIVE_CHANNEL", ""),
        ]))
        .unwrap();
        assert_eq!(config.interval, Duration::from_secs(1800));
        assert_eq!(config.proactive_channel, "cli");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = HeartbeatConfig::from_lookup(lookup(&[("HEARTBEAT_ENABLED", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "HEARTBEAT_ENABLED"));

        let err = HeartbeatConfig::from_lookup(lookup(&[("HEARTBEAT_INTERVAL_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = HeartbeatConfig::from_lookup(lookup(&[("HEARTBEAT_INTERVAL_SECS", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_proactive_requires_chat_id() {
        let mut config = HeartbeatConfig::default();
        config.proactive_enabled = true;
        assert!(!config.proactive_active());

        let config = HeartbeatConfig::default().with_proactive("telegram", "7");
        assert!(config.proactive_active());
    }

    #[test]
    fn test_from_toml() {
        let config = HeartbeatConfig::from_toml(
            r#"
            workspace = "/srv/agent"
            interval_secs = 900
            proactive_enabled = true
            proactive_chat_id = "99"
            "#,
        )
        .unwrap();

        assert_eq!(config.workspace, PathBuf::from("/srv/agent"));
        assert_eq!(config.interval, Duration::from_secs(900));
        assert!(config.enabled);
        assert_eq!(config.proactive_channel, "cli");
        assert!(config.proactive_active());
    }

    #[test]
    fn test_from_toml_rejects_bad_input() {
        assert!(matches!(
            HeartbeatConfig::from_toml("interval_secs = 0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            HeartbeatConfig::from_toml("interval = 5"),
            Err(ConfigError::Parse(_))
        ));
    }
}
