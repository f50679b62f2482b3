//! Runtime configuration.
//!
//! Configuration is a plain serde structure. It can be parsed from JSON or
//! assembled from `ETMS_*` environment variables layered over the defaults.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::PathBuf;
use thiserror::Error;

/// Default number of identifier allocation attempts per creation request.
pub const DEFAULT_MAX_ALLOCATION_ATTEMPTS: NonZeroU32 = match NonZeroU32::new(10) {
    Some(value) => value,
    None => NonZeroU32::MIN,
};

/// Default maximum attachment size (10 MiB).
pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// An environment variable held an unusable value.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Offending key.
        key: &'static str,
        /// Raw value.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Top-level ETMS configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EtmsConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Identifier allocation settings.
    pub allocation: AllocationConfig,
    /// Attachment storage settings.
    pub attachments: AttachmentConfig,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: Option<String>,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

/// How candidate sequence numbers are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// Atomic per-kind counter.
    #[default]
    Counter,
    /// Highest existing identifier plus one.
    MaxScan,
}

impl AllocationStrategy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "counter" => Some(Self::Counter),
            "max_scan" | "max-scan" => Some(Self::MaxScan),
            _ => None,
        }
    }
}

/// Identifier allocation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllocationConfig {
    /// Sequence source strategy.
    pub strategy: AllocationStrategy,
    /// Attempts before giving up with an exhaustion error.
    pub max_attempts: NonZeroU32,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            strategy: AllocationStrategy::default(),
            max_attempts: DEFAULT_MAX_ALLOCATION_ATTEMPTS,
        }
    }
}

/// Attachment storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttachmentConfig {
    /// Directory holding attachment blobs.
    pub root_dir: Option<PathBuf>,
    /// Largest accepted upload in bytes.
    pub max_bytes: u64,
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            root_dir: None,
            max_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
        }
    }
}

impl EtmsConfig {
    /// Parses configuration from a JSON document; omitted fields keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields, and
    /// [`ConfigError::InvalidValue`] for a zero pool size.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup, layering recognised
    /// `ETMS_*` keys over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("ETMS_DATABASE_URL") {
            config.database.url = Some(url);
        }
        if let Some(raw) = lookup("ETMS_DATABASE_POOL_SIZE") {
            config.database.pool_size = parse_number("ETMS_DATABASE_POOL_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("ETMS_ID_STRATEGY") {
            config.allocation.strategy =
                AllocationStrategy::parse(&raw).ok_or(ConfigError::InvalidValue {
                    key: "ETMS_ID_STRATEGY",
                    value: raw,
                    reason: "expected 'counter' or 'max_scan'",
                })?;
        }
        if let Some(raw) = lookup("ETMS_ID_MAX_ATTEMPTS") {
            let attempts: u32 = parse_number("ETMS_ID_MAX_ATTEMPTS", &raw)?;
            config.allocation.max_attempts =
                NonZeroU32::new(attempts).ok_or(ConfigError::InvalidValue {
                    key: "ETMS_ID_MAX_ATTEMPTS",
                    value: raw,
                    reason: "must be at least 1",
                })?;
        }
        if let Some(dir) = lookup("ETMS_ATTACHMENT_DIR") {
            config.attachments.root_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup("ETMS_ATTACHMENT_MAX_BYTES") {
            config.attachments.max_bytes = parse_number("ETMS_ATTACHMENT_MAX_BYTES", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "database.pool_size",
                value: "0".to_owned(),
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_owned(),
        reason: "expected a non-negative integer",
    })
}
