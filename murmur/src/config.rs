//! Settings for the store, the server and reconnecting clients.
//!
//! Everything has a default; environment variables override individual
//! values:
//!
//! | variable                    | default                 |
//! |-----------------------------|-------------------------|
//! | `MURMUR_BIND`               | `0.0.0.0:7755`          |
//! | `DATABASE_URL`              | `sqlite::memory:`       |
//! | `MURMUR_RETENTION`          | `1024`                  |
//! | `MURMUR_BATCH_SIZE`         | `256`                   |
//! | `MURMUR_ENDPOINT`           | `http://127.0.0.1:7755` |
//! | `MURMUR_BACKOFF_INITIAL_MS` | `50`                    |
//! | `MURMUR_BACKOFF_MAX_MS`     | `5000`                  |

use std::{
    fmt::Debug,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    str::FromStr,
    time::Duration,
};

use thiserror::Error;

use crate::constants::{
    BACKLOG_BATCH_SIZE, DEFAULT_BACKOFF_INITIAL, DEFAULT_BACKOFF_MAX, RETENTION_LIMIT,
};

/// Port the server listens on by default.
pub const DEFAULT_PORT: u16 = 7755;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Parse `key` from `lookup` if it's set, otherwise keep `default`.
fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Debug,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e| ConfigError::Invalid {
            key,
            value,
            reason: format!("{e:?}"),
        }),
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Retention window and backlog paging of a message store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Most recent messages kept by the persistence layer.
    pub retention: usize,
    /// Messages per backlog read.
    pub batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            retention: RETENTION_LIMIT,
            batch_size: BACKLOG_BATCH_SIZE,
        }
    }
}

impl StoreConfig {
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            retention: parse_or(&lookup, "MURMUR_RETENTION", default.retention)?,
            batch_size: parse_or(&lookup, "MURMUR_BATCH_SIZE", default.batch_size)?,
        })
    }
}

/// Reconnect delays of a reliable subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: DEFAULT_BACKOFF_INITIAL,
            max: DEFAULT_BACKOFF_MAX,
        }
    }
}

impl BackoffConfig {
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let default = Self::default();
        let initial = parse_or(
            &lookup,
            "MURMUR_BACKOFF_INITIAL_MS",
            default.initial.as_millis() as u64,
        )?;
        let max = parse_or(&lookup, "MURMUR_BACKOFF_MAX_MS", default.max.as_millis() as u64)?;
        Ok(Self {
            initial: Duration::from_millis(initial),
            max: Duration::from_millis(max),
        })
    }
}

/// Everything the chat server needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub database_url: String,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PORT).into(),
            database_url: "sqlite::memory:".to_string(),
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            bind: parse_or(&lookup, "MURMUR_BIND", default.bind)?,
            database_url: lookup("DATABASE_URL").unwrap_or(default.database_url),
            store: StoreConfig::from_lookup(&lookup)?,
        })
    }
}

/// Everything a remote client needs to follow the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub backoff: BackoffConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: format!("http://127.0.0.1:{DEFAULT_PORT}"),
            backoff: BackoffConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            endpoint: lookup("MURMUR_ENDPOINT").unwrap_or(default.endpoint),
            backoff: BackoffConfig::from_lookup(&lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.store.retention, 1024);
        assert_eq!(config.store.batch_size, 256);
        assert_eq!(config.bind.port(), 7755);

        let client = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(client.endpoint, "http://127.0.0.1:7755");
        assert_eq!(client.backoff.initial, Duration::from_millis(50));
    }

    #[test]
    fn overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("MURMUR_BIND", "127.0.0.1:9000"),
            ("DATABASE_URL", "sqlite://chat.db"),
            ("MURMUR_RETENTION", "64"),
        ]))
        .unwrap();
        assert_eq!(config.bind, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.database_url, "sqlite://chat.db");
        assert_eq!(config.store.retention, 64);
        assert_eq!(config.store.batch_size, 256);

        let client = ClientConfig::from_lookup(lookup(&[
            ("MURMUR_BACKOFF_INITIAL_MS", "10"),
            ("MURMUR_BACKOFF_MAX_MS", " 80 "),
        ]))
        .unwrap();
        assert_eq!(
            client.backoff,
            BackoffConfig {
                initial: Duration::from_millis(10),
                max: Duration::from_millis(80)
            }
        );
    }

    #[test]
    fn rejects_garbage() {
        let error = StoreConfig::from_lookup(lookup(&[("MURMUR_BATCH_SIZE", "lots")])).unwrap_err();
        assert!(error.to_string().contains("MURMUR_BATCH_SIZE"));
    }
}
