//! Engine configuration.
//!
//! Loaded from TOML. Every section and key is optional; an empty file yields
//! the default behaviour.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::rule::{RuleEvaluator, UnknownOperatorPolicy};
use crate::validation::Validator;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Conditional rule settings.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Validation settings.
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Builds the rule evaluator described by this configuration.
    #[must_use]
    pub fn evaluator(&self) -> RuleEvaluator {
        RuleEvaluator::new(self.rules.unknown_operator)
    }

    /// Builds the validator described by this configuration.
    #[must_use]
    pub fn validator(&self) -> Validator {
        Validator::new(self.validation.enforce_optional_constraints)
    }
}

/// `[rules]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Outcome of an unrecognised conditional operator.
    #[serde(default)]
    pub unknown_operator: UnknownOperatorPolicy,
}

/// `[validation]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Apply `min`, `max` and `pattern` to optional fields as well.
    #[serde(default)]
    pub enforce_optional_constraints: bool,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
