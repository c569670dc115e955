use std::{net::SocketAddr, time::Duration};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env` when present)
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    /// `None` keeps the response cache in-process
    pub redis_url: Option<String>,
    pub redis_pool_size: usize,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub cache_ttl: Duration,
    /// Trust `x-forwarded-for` for the audit log IP
    pub trust_proxy: bool,
}

impl AppConfig {
    pub const DEFAULT_JWT_SECRET: &'static str = "dev-secret-key";
    const DEFAULT_BIND_ADDR: &'static str = "0.0.0.0:3000";
    const DEFAULT_REDIS_POOL_SIZE: usize = 16;
    const DEFAULT_CACHE_TTL_SECS: u64 = 300;

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| dotenvy::var(name).ok())
    }

    /// Builds the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| Self::DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_addr.clone(),
        })?;

        let redis_pool_size = match var("REDIS_POOL_SIZE") {
            Some(value) => parse_positive("REDIS_POOL_SIZE", &value)? as usize,
            None => Self::DEFAULT_REDIS_POOL_SIZE,
        };

        let cache_ttl_secs = match var("CACHE_TTL_SECS") {
            Some(value) => parse_positive("CACHE_TTL_SECS", &value)?,
            None => Self::DEFAULT_CACHE_TTL_SECS,
        };

        let trust_proxy = match var("TRUST_PROXY").as_deref().map(str::trim) {
            None | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "TRUST_PROXY",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            database_url,
            redis_url: var("REDIS_URL"),
            redis_pool_size,
            jwt_secret: var("JWT_SECRET").unwrap_or_else(|| Self::DEFAULT_JWT_SECRET.to_string()),
            bind_addr,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            trust_proxy,
        })
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod test {
    use crate::config::{AppConfig, ConfigError};
    use std::{collections::HashMap, time::Duration};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db")])).unwrap();

        assert_eq!(config.database_url, "postgres://db");
        assert_eq!(config.redis_url, None);
        assert_eq!(config.redis_pool_size, 16);
        assert_eq!(config.jwt_secret, AppConfig::DEFAULT_JWT_SECRET);
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert!(!config.trust_proxy);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db"),
            ("REDIS_URL", "redis://cache:6379"),
            ("REDIS_POOL_SIZE", "4"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("CACHE_TTL_SECS", "60"),
            ("TRUST_PROXY", "true"),
        ]))
        .unwrap();

        assert!(config.trust_proxy);
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.redis_pool_size, 4);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_database_url() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_values() {
        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db"),
            ("CACHE_TTL_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "CACHE_TTL_SECS", .. }));

        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db"),
            ("BIND_ADDR", "localhost"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BIND_ADDR", .. }));

        let err = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db"),
            ("TRUST_PROXY", "maybe"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "TRUST_PROXY", .. }));
    }
}
