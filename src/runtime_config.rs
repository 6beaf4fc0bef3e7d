//! # Runtime Configuration Module
//!
//! Routing and registry settings, read from environment variables and/or a
//! YAML file.
//!
//! ## Environment Variables
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `CPR_CASE_INSENSITIVE_SEGMENTS` | `case_sensitivity` (`no`/`false` → sensitive) | insensitive |
//! | `CPR_RESUME_MARKER` | `resume_marker` | `x` |
//! | `CPR_FACTORY_KEY_WIDTH` | `factory_key_width` | `3` |
//! | `CPR_INSTANCE_KEY_LEN` | `instance_key_len` | `10` |
//! | `CPR_CONTINUATION_TTL_SECS` | `continuation_ttl_secs` | `300` |
//!
//! Unparseable numbers are ignored with a warning and the previous value
//! kept. A zero factory width, an instance key shorter than
//! [`MIN_INSTANCE_KEY_LEN`], an empty marker, or a marker containing `/`
//! are rejected.
//!
//! ## YAML
//!
//! ```yaml
//! case_sensitivity: sensitive
//! resume_marker: resume
//! factory_key_width: 4
//! instance_key_len: 16
//! continuation_ttl_secs: 600
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use cprouter::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_yaml_str("resume_marker: go\n").unwrap();
//! assert_eq!(config.resume_marker, "go");
//! assert_eq!(config.factory_key_width, 3);
//! ```

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::message::CaseSensitivity;
use crate::registry::RegistryConfig;

pub const ENV_CASE_INSENSITIVE: &str = "CPR_CASE_INSENSITIVE_SEGMENTS";
pub const ENV_RESUME_MARKER: &str = "CPR_RESUME_MARKER";
pub const ENV_FACTORY_KEY_WIDTH: &str = "CPR_FACTORY_KEY_WIDTH";
pub const ENV_INSTANCE_KEY_LEN: &str = "CPR_INSTANCE_KEY_LEN";
pub const ENV_CONTINUATION_TTL_SECS: &str = "CPR_CONTINUATION_TTL_SECS";

/// Shortest accepted instance key. Shorter keys leave a key space small
/// enough for live continuations to fill.
pub const MIN_INSTANCE_KEY_LEN: usize = 8;

/// Errors from loading or validating a [`RuntimeConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Parse(serde_yaml::Error),
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            ConfigError::Parse(err) => write!(f, "invalid config YAML: {err}"),
            ConfigError::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid { .. } => None,
        }
    }
}

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub case_sensitivity: CaseSensitivity,
    /// First path segment that introduces a continuation key.
    pub resume_marker: String,
    pub factory_key_width: usize,
    pub instance_key_len: usize,
    pub continuation_ttl_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let registry = RegistryConfig::default();
        Self {
            case_sensitivity: CaseSensitivity::default(),
            resume_marker: "x".to_string(),
            factory_key_width: registry.factory_key_width,
            instance_key_len: registry.instance_key_len,
            continuation_ttl_secs: registry.ttl.as_secs(),
        }
    }
}

fn parse_or_keep<T: FromStr + Copy>(name: &str, raw: Option<String>, current: T) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %value, "Ignoring unparseable config value");
            current
        }),
        None => current,
    }
}

impl RuntimeConfig {
    /// Defaults overlaid with the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the result fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// Parse YAML; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed YAML or unknown keys, and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// As [`RuntimeConfig::from_yaml_str`], plus [`ConfigError::Io`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Overlay the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the result fails validation.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|name| env::var(name).ok())
    }

    /// Overlay values from an arbitrary lookup (used by tests instead of the
    /// real environment).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the result fails validation.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_CASE_INSENSITIVE) {
            self.case_sensitivity = CaseSensitivity::parse_setting(&value);
        }
        if let Some(marker) = lookup(ENV_RESUME_MARKER) {
            self.resume_marker = marker.trim().to_string();
        }
        self.factory_key_width = parse_or_keep(
            ENV_FACTORY_KEY_WIDTH,
            lookup(ENV_FACTORY_KEY_WIDTH),
            self.factory_key_width,
        );
        self.instance_key_len = parse_or_keep(
            ENV_INSTANCE_KEY_LEN,
            lookup(ENV_INSTANCE_KEY_LEN),
            self.instance_key_len,
        );
        self.continuation_ttl_secs = parse_or_keep(
            ENV_CONTINUATION_TTL_SECS,
            lookup(ENV_CONTINUATION_TTL_SECS),
            self.continuation_ttl_secs,
        );
        self.validate()?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.factory_key_width == 0 {
            return Err(ConfigError::Invalid {
                field: "factory_key_width",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.instance_key_len < MIN_INSTANCE_KEY_LEN {
            return Err(ConfigError::Invalid {
                field: "instance_key_len",
                reason: format!("must be at least {MIN_INSTANCE_KEY_LEN}"),
            });
        }
        if self.resume_marker.is_empty() || self.resume_marker.contains('/') {
            return Err(ConfigError::Invalid {
                field: "resume_marker",
                reason: format!("'{}' is not a single path segment", self.resume_marker),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn continuation_ttl(&self) -> Duration {
        Duration::from_secs(self.continuation_ttl_secs)
    }

    #[must_use]
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::new(
            self.factory_key_width,
            self.instance_key_len,
            self.continuation_ttl(),
        )
    }
}
