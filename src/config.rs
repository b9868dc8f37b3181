//! Project configuration for ftcfix.
//!
//! Loaded from `ftcfix.yaml` (or `.ftcfix.yaml`) next to the robot code.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::{RuleId, Severity};

/// Default field half-extent in inches (a 144" field centered on the origin).
pub const DEFAULT_HALF_EXTENT: f64 = 72.0;

/// File names searched for by [`discover`], in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["ftcfix.yaml", ".ftcfix.yaml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown rule {0:?}")]
    UnknownRule(String),

    #[error("half_extent must be a finite positive number, got {0}")]
    HalfExtent(f64),

    #[error("invalid excluded_paths pattern {pattern:?}: {message}")]
    Glob { pattern: String, message: String },

    #[error("invalid hardware type name {0:?}")]
    HardwareType(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Offset between the corner-origin and center-origin conventions.
    #[serde(default = "default_half_extent")]
    pub half_extent: f64,
    /// Rule ids that never run.
    #[serde(default)]
    pub disabled_rules: Vec<String>,
    /// Severity overrides by rule id.
    #[serde(default)]
    pub severity: BTreeMap<String, Severity>,
    /// Device types treated like the built-in hardware types.
    #[serde(default)]
    pub extra_hardware_types: Vec<String>,
    /// Glob patterns for paths to skip when scanning directories.
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

fn default_half_extent() -> f64 {
    DEFAULT_HALF_EXTENT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            half_extent: DEFAULT_HALF_EXTENT,
            disabled_rules: Vec::new(),
            severity: BTreeMap::new(),
            extra_hardware_types: Vec::new(),
            excluded_paths: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_enabled(&self, rule: RuleId) -> bool {
        !self.disabled_rules.iter().any(|r| r == rule.as_str())
    }

    /// Configured severity for `rule`, falling back to its default.
    pub fn severity_for(&self, rule: RuleId) -> Severity {
        self.severity
            .get(rule.as_str())
            .copied()
            .unwrap_or_else(|| rule.default_severity())
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.excluded_paths.iter().any(|pattern| {
            globset::Glob::new(pattern)
                .map(|g| g.compile_matcher().is_match(&*path_str))
                .unwrap_or(false)
        })
    }
}

/// Validate a configuration for correctness.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if !config.half_extent.is_finite() || config.half_extent <= 0.0 {
        return Err(ConfigError::HalfExtent(config.half_extent));
    }

    for rule in config.disabled_rules.iter().chain(config.severity.keys()) {
        if RuleId::parse(rule).is_none() {
            return Err(ConfigError::UnknownRule(rule.clone()));
        }
    }

    for name in &config.extra_hardware_types {
        let valid = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(ConfigError::HardwareType(name.clone()));
        }
    }

    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern).map_err(|e| ConfigError::Glob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
    }

    Ok(())
}

/// Find a config file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}
