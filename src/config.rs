// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service configuration from environment variables
//!
//! | variable                        | default                 |
//! |---------------------------------|-------------------------|
//! | `NATS_URL`                      | `nats://localhost:4222` |
//! | `NATS_CLIENT_NAME`              | `inventory-service`     |
//! | `NATS_CONNECT_TIMEOUT_SECS`     | `10`                    |
//! | `NATS_REQUEST_TIMEOUT_SECS`     | `5`                     |
//! | `INVENTORY_RPC_SUBJECT`         | `inventory.rpc`         |
//! | `INVENTORY_EVENT_SUBJECT`       | `inventory.events`      |
//! | `INVENTORY_QUEUE_GROUP`         | `inventory-service`     |
//! | `INVENTORY_STORE`               | `memory` (or `nats-kv`) |
//! | `INVENTORY_KV_BUCKET`           | `INVENTORY`             |
//! | `INVENTORY_MAX_WRITE_ATTEMPTS`  | `8`                     |
//! | `INVENTORY_LOW_STOCK_THRESHOLD` | unset                   |

use std::str::FromStr;
use std::time::Duration;

use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::nats::{NatsConfig, RpcEndpoints};
use crate::service::LedgerSettings;

/// Default KV bucket for the `nats-kv` store
pub const DEFAULT_KV_BUCKET: &str = "INVENTORY";

/// Where inventory records live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory; lost on restart
    Memory,
    /// JetStream key-value bucket
    NatsKv { bucket: String },
}

/// Everything the service binary needs to start
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub nats: NatsConfig,
    pub endpoints: RpcEndpoints,
    pub storage: StorageBackend,
    pub ledger: LedgerSettings,
}

impl ServiceConfig {
    /// Read the process environment
    pub fn from_env() -> InfrastructureResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset variables take defaults
    pub fn from_lookup<F>(lookup: F) -> InfrastructureResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let nats_defaults = NatsConfig::default();
        let nats = NatsConfig {
            servers: match var("NATS_URL") {
                Some(urls) => urls
                    .split(',')
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(str::to_string)
                    .collect(),
                None => nats_defaults.servers,
            },
            name: var("NATS_CLIENT_NAME").unwrap_or(nats_defaults.name),
            connect_timeout: seconds(&var, "NATS_CONNECT_TIMEOUT_SECS")?
                .unwrap_or(nats_defaults.connect_timeout),
            request_timeout: seconds(&var, "NATS_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(nats_defaults.request_timeout),
        };

        let endpoint_defaults = RpcEndpoints::default();
        let endpoints = RpcEndpoints {
            rpc_subject: var("INVENTORY_RPC_SUBJECT").unwrap_or(endpoint_defaults.rpc_subject),
            event_subject: var("INVENTORY_EVENT_SUBJECT")
                .unwrap_or(endpoint_defaults.event_subject),
            queue_group: var("INVENTORY_QUEUE_GROUP").unwrap_or(endpoint_defaults.queue_group),
        };

        let storage = match var("INVENTORY_STORE").as_deref().map(str::trim) {
            None | Some("memory") => StorageBackend::Memory,
            Some("nats-kv") => StorageBackend::NatsKv {
                bucket: var("INVENTORY_KV_BUCKET").unwrap_or_else(|| DEFAULT_KV_BUCKET.to_string()),
            },
            Some(other) => {
                return Err(InfrastructureError::Configuration(format!(
                    "INVENTORY_STORE must be 'memory' or 'nats-kv', got '{other}'"
                )))
            }
        };

        let ledger_defaults = LedgerSettings::default();
        let max_write_attempts =
            number::<u32>(&var, "INVENTORY_MAX_WRITE_ATTEMPTS")?.unwrap_or(ledger_defaults.max_write_attempts);
        if max_write_attempts == 0 {
            return Err(InfrastructureError::Configuration(
                "INVENTORY_MAX_WRITE_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        let ledger = LedgerSettings {
            max_write_attempts,
            low_stock_threshold: number::<u64>(&var, "INVENTORY_LOW_STOCK_THRESHOLD")?,
        };

        Ok(Self {
            nats,
            endpoints,
            storage,
            ledger,
        })
    }
}

fn number<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> InfrastructureResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                InfrastructureError::Configuration(format!("{key}='{raw}' is not a valid number: {e}"))
            })
        })
        .transpose()
}

fn seconds(var: &impl Fn(&str) -> Option<String>, key: &str) -> InfrastructureResult<Option<Duration>> {
    Ok(number::<u64>(var, key)?.map(Duration::from_secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> InfrastructureResult<ServiceConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.nats.servers, vec!["nats://localhost:4222".to_string()]);
        assert_eq!(config.endpoints, RpcEndpoints::default());
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.ledger, LedgerSettings::default());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("NATS_URL", "nats://a:4222, nats://b:4222"),
            ("NATS_REQUEST_TIMEOUT_SECS", "2"),
            ("INVENTORY_RPC_SUBJECT", "shop.inventory.rpc"),
            ("INVENTORY_STORE", "nats-kv"),
            ("INVENTORY_KV_BUCKET", "STOCK"),
            ("INVENTORY_MAX_WRITE_ATTEMPTS", "3"),
            ("INVENTORY_LOW_STOCK_THRESHOLD", "5"),
        ])
        .unwrap();

        assert_eq!(
            config.nats.servers,
            vec!["nats://a:4222".to_string(), "nats://b:4222".to_string()]
        );
        assert_eq!(config.nats.request_timeout, Duration::from_secs(2));
        assert_eq!(config.endpoints.rpc_subject, "shop.inventory.rpc");
        assert_eq!(
            config.storage,
            StorageBackend::NatsKv {
                bucket: "STOCK".to_string()
            }
        );
        assert_eq!(config.ledger.max_write_attempts, 3);
        assert_eq!(config.ledger.low_stock_threshold, Some(5));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            config(&[("INVENTORY_STORE", "postgres")]),
            Err(InfrastructureError::Configuration(_))
        ));
        assert!(matches!(
            config(&[("INVENTORY_MAX_WRITE_ATTEMPTS", "0")]),
            Err(InfrastructureError::Configuration(_))
        ));
        assert!(matches!(
            config(&[("INVENTORY_LOW_STOCK_THRESHOLD", "-1")]),
            Err(InfrastructureError::Configuration(_))
        ));
    }
}
