//! Configuration schema (tabula.toml)

use crate::codec::DEFAULT_DATE_TIME_PATTERN;
use serde::{Deserialize, Serialize};

/// SQL dialect configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectConfig {
    /// PostgreSQL
    Postgres,

    /// MySQL / MariaDB
    #[serde(alias = "mariadb")]
    MySql,

    /// H2
    H2,

    /// Generic ANSI SQL
    #[default]
    Ansi,
}

impl std::str::FromStr for DialectConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "h2" => Ok(Self::H2),
            "ansi" => Ok(Self::Ansi),
            other => Err(ConfigError::ParseError(format!("unknown dialect '{}'", other))),
        }
    }
}

/// When type-based default codecs apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecPolicy {
    /// Temporal and numeric defaults replace any explicitly declared codec
    #[default]
    Overwrite,

    /// Defaults only apply when the property declared no codec
    Fallback,
}

/// How property failures affect the mapping pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Stop at the first failing property
    #[default]
    FailFast,

    /// Map every property, then report all failures together
    Collect,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    /// SQL dialect
    #[serde(default)]
    pub dialect: DialectConfig,

    /// Default codec policy
    #[serde(default)]
    pub codec_policy: CodecPolicy,

    /// Property failure policy
    #[serde(default)]
    pub error_policy: ErrorPolicy,

    /// Pattern for the default date-time codec
    #[serde(default = "default_date_time_pattern")]
    pub date_time_pattern: String,
}

fn default_date_time_pattern() -> String {
    DEFAULT_DATE_TIME_PATTERN.to_string()
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            dialect: DialectConfig::default(),
            codec_policy: CodecPolicy::default(),
            error_policy: ErrorPolicy::default(),
            date_time_pattern: default_date_time_pattern(),
        }
    }
}

impl MappingConfig {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Set the dialect
    pub fn with_dialect(mut self, dialect: DialectConfig) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the codec policy
    pub fn with_codec_policy(mut self, policy: CodecPolicy) -> Self {
        self.codec_policy = policy;
        self
    }

    /// Set the error policy
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
