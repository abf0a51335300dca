//! Engine configuration loaded from the environment.

use std::time::Duration;

use thiserror::Error;

use stockflow_inventory::LOW_STOCK_THRESHOLD;

pub const LOCK_TIMEOUT_ENV: &str = "STOCKFLOW_LOCK_TIMEOUT_MS";
pub const LOW_STOCK_THRESHOLD_ENV: &str = "STOCKFLOW_LOW_STOCK_THRESHOLD";

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(2_000);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Tunables for the placement engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on waiting for a product's row lock before failing `Busy`.
    pub lock_timeout: Duration,
    /// Stock changes landing strictly below this raise an alert.
    pub low_stock_threshold: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            low_stock_threshold: LOW_STOCK_THRESHOLD,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(LOCK_TIMEOUT_ENV) {
            let ms: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    key: LOCK_TIMEOUT_ENV,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
            if ms == 0 {
                return Err(ConfigError::Invalid {
                    key: LOCK_TIMEOUT_ENV,
                    value: raw,
                    reason: "must be positive".into(),
                });
            }
            config.lock_timeout = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup(LOW_STOCK_THRESHOLD_ENV) {
            let threshold: i64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    key: LOW_STOCK_THRESHOLD_ENV,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
            if threshold < 0 {
                return Err(ConfigError::Invalid {
                    key: LOW_STOCK_THRESHOLD_ENV,
                    value: raw,
                    reason: "must not be negative".into(),
                });
            }
            config.low_stock_threshold = threshold;
        }

        Ok(config)
    }
}
