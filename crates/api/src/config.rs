//! Server configuration from the environment.

use std::net::SocketAddr;

use anyhow::Context;

use stockflow_infra::EngineConfig;

pub const BIND_ADDR_ENV: &str = "STOCKFLOW_BIND_ADDR";
pub const SEED_DEMO_ENV: &str = "STOCKFLOW_SEED_DEMO";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// Load a small demo catalog at startup.
    pub seed_demo: bool,
    pub engine: EngineConfig,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let raw_addr = lookup(BIND_ADDR_ENV).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = raw_addr
            .trim()
            .parse()
            .with_context(|| format!("invalid {BIND_ADDR_ENV}: {raw_addr:?}"))?;

        let seed_demo = lookup(SEED_DEMO_ENV)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let engine = EngineConfig::from_lookup(&lookup)?;

        Ok(Self {
            bind_addr,
            seed_demo,
            engine,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_all_interfaces_without_demo_data() {
        let config = ApiConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");
        assert!(!config.seed_demo);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn overrides_are_read() {
        let config = ApiConfig::from_lookup(|key| match key {
            BIND_ADDR_ENV => Some("127.0.0.1:9000".into()),
            SEED_DEMO_ENV => Some("true".into()),
            "STOCKFLOW_LOCK_TIMEOUT_MS" => Some("500".into()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert!(config.seed_demo);
        assert_eq!(config.engine.lock_timeout.as_millis(), 500);
    }

    #[test]
    fn bad_address_is_an_error() {
        let err = ApiConfig::from_lookup(|key| (key == BIND_ADDR_ENV).then(|| "nowhere".into()))
            .unwrap_err();
        assert!(err.to_string().contains(BIND_ADDR_ENV));
    }
}
