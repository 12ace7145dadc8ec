//! Configuration for the guiscript action engine
//!
//! - [`EngineConfig`] - pacing, worker pools and limits, loaded from YAML
//! - [`ScriptFile`] - named action lists for the command line runner
//!
//! # Example
//!
//! ```
//! use gs_config::EngineConfig;
//!
//! let config = EngineConfig::from_yaml_str("max_delay_ms: 5000").unwrap();
//! assert_eq!(config.max_delay_ms, 5000);
//! assert_eq!(config.default_action_type, "message");
//! ```

mod engine;
mod error;
mod script;

pub use engine::{EngineConfig, PacingConfig, PoolConfig, MAX_DELAY_MS};
pub use error::{ConfigError, ConfigResult};
pub use script::ScriptFile;
