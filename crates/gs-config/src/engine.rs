//! Engine configuration

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Hard upper bound for a single delay
pub const MAX_DELAY_MS: u64 = 30_000;

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Type used for raw strings without a `type:` prefix
    #[serde(default = "default_action_type")]
    pub default_action_type: String,

    /// Longest accepted delay; values above [`MAX_DELAY_MS`] are clamped
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// How many combinator levels may nest (conditional inside random ...)
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,

    #[serde(default)]
    pub pools: PoolConfig,

    #[serde(default)]
    pub pacing: PacingConfig,
}

fn default_action_type() -> String {
    "message".to_string()
}

fn default_max_delay_ms() -> u64 {
    MAX_DELAY_MS
}

fn default_max_nesting_depth() -> usize {
    8
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_action_type: default_action_type(),
            max_delay_ms: default_max_delay_ms(),
            max_nesting_depth: default_max_nesting_depth(),
            pools: PoolConfig::default(),
            pacing: PacingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        if yaml.trim().is_empty() {
            return Self::default().validate();
        }
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()
    }

    /// Load and validate configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        if content.trim().is_empty() {
            return Self::default().validate();
        }

        let config: EngineConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseYaml {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()
    }

    /// Check limits, clamping the delay cap to [`MAX_DELAY_MS`]
    pub fn validate(mut self) -> ConfigResult<Self> {
        self.default_action_type = self.default_action_type.trim().to_lowercase();
        if self.default_action_type.is_empty() {
            return Err(ConfigError::invalid(
                "default_action_type",
                "must not be empty",
            ));
        }

        if self.max_delay_ms > MAX_DELAY_MS {
            warn!(
                configured = self.max_delay_ms,
                cap = MAX_DELAY_MS,
                "max_delay_ms above the hard cap, clamping"
            );
            self.max_delay_ms = MAX_DELAY_MS;
        }

        if self.max_nesting_depth == 0 {
            return Err(ConfigError::invalid(
                "max_nesting_depth",
                "must be at least 1",
            ));
        }
        if self.pools.random_workers == 0 {
            return Err(ConfigError::invalid(
                "pools.random_workers",
                "must be at least 1",
            ));
        }
        if self.pools.delay_workers == 0 {
            return Err(ConfigError::invalid(
                "pools.delay_workers",
                "must be at least 1",
            ));
        }

        Ok(self)
    }

    /// Delay cap as a duration
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Worker pool sizes for the asynchronous handlers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Concurrent random selections
    pub random_workers: usize,

    /// Concurrent scheduled delays
    pub delay_workers: usize,

    /// How long shutdown waits for in-flight tasks before aborting them
    pub shutdown_timeout_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            random_workers: 4,
            delay_workers: 16,
            shutdown_timeout_ms: 5_000,
        }
    }
}

impl PoolConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

/// Pause between the values of a multi-value action, per type, in ms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PacingConfig {
    pub message: u64,
    pub broadcast: u64,
    pub actionbar: u64,
    pub title: u64,
    pub sound: u64,
    pub command: u64,
    pub console: u64,
    pub economy: u64,
    pub gamemode: u64,
    pub inventory: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            message: 50,
            broadcast: 100,
            actionbar: 500,
            title: 1_000,
            sound: 100,
            command: 100,
            console: 100,
            economy: 100,
            gamemode: 250,
            inventory: 100,
        }
    }
}

impl PacingConfig {
    /// Pacing for an action type; types without pacing get zero
    pub fn for_type(&self, action_type: &str) -> Duration {
        let ms = match action_type {
            "message" => self.message,
            "broadcast" => self.broadcast,
            "actionbar" => self.actionbar,
            "title" => self.title,
            "sound" => self.sound,
            "command" => self.command,
            "console" => self.console,
            "economy" => self.economy,
            "gamemode" => self.gamemode,
            "inventory" => self.inventory,
            _ => 0,
        };
        Duration::from_millis(ms)
    }

    /// No pacing at all
    pub fn none() -> Self {
        Self {
            message: 0,
            broadcast: 0,
            actionbar: 0,
            title: 0,
            sound: 0,
            command: 0,
            console: 0,
            economy: 0,
            gamemode: 0,
            inventory: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.default_action_type, "message");
        assert_eq!(config.max_delay_ms, 30_000);
        assert_eq!(config.pools.random_workers, 4);
        assert_eq!(config.pacing.for_type("title"), Duration::from_millis(1_000));
        assert_eq!(config.pacing.for_type("delay"), Duration::ZERO);
    }

    #[test]
    fn test_parse_partial_yaml() {
        let config = EngineConfig::from_yaml_str(
            r#"
default_action_type: Console
pools:
  delay_workers: 2
pacing:
  message: 0
"#,
        )
        .unwrap();

        assert_eq!(config.default_action_type, "console");
        assert_eq!(config.pools.delay_workers, 2);
        assert_eq!(config.pools.random_workers, 4);
        assert_eq!(config.pacing.message, 0);
        assert_eq!(config.pacing.broadcast, 100);
    }

    #[test]
    fn test_delay_cap_is_clamped() {
        let config = EngineConfig::from_yaml_str("max_delay_ms: 60000").unwrap();
        assert_eq!(config.max_delay_ms, MAX_DELAY_MS);

        let config = EngineConfig::from_yaml_str("max_delay_ms: 1000").unwrap();
        assert_eq!(config.max_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_rejects_zero_limits() {
        let err = EngineConfig::from_yaml_str("pools:\n  random_workers: 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "pools.random_workers"));

        let err = EngineConfig::from_yaml_str("max_nesting_depth: 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "max_nesting_depth"));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = EngineConfig::from_yaml_str("max_dealy_ms: 10").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_nesting_depth: 3").unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.max_nesting_depth, 3);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::load(dir.path().join("engine.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
