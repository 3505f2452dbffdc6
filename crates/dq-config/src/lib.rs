//! Configuration loading: layered YAML overlays for static defaults, plus
//! an env-backed [`AppConfig`] for the handful of settings that vary per
//! deployment (database URL, encryption key, concurrency limits).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::time::Duration;

/// Load + merge YAML files in order, then canonicalize to JSON and hash.
/// Later files override earlier files via deep-merge. Used for the sensor
/// template catalog and the check-registry seed data, which ship as YAML
/// under `config/` and are loaded once at startup.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(Default::default());

    for p in paths {
        let s = fs::read_to_string(p).with_context(|| format!("read config: {p}"))?;
        let yaml_val: serde_yaml::Value =
            serde_yaml::from_str(&s).with_context(|| format!("parse yaml: {p}"))?;
        let json_val = serde_json::to_value(yaml_val).context("yaml->json conversion failed")?;
        deep_merge(&mut merged, json_val);
    }

    let canonical = canonicalize_json(&merged);

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let hash = hex::encode(hasher.finalize());

    Ok(LoadedConfig {
        config_json: serde_json::from_str(&canonical).context("canonical json parse failed")?,
        canonical_json: canonical,
        config_hash: hash,
    })
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_json: Value,
    pub canonical_json: String,
    pub config_hash: String,
}

/// Deep-merge: objects merge recursively; arrays replaced; scalars overwritten.
fn deep_merge(dst: &mut Value, src: Value) {
    match (dst, src) {
        (Value::Object(dst_map), Value::Object(src_map)) => {
            for (k, v) in src_map {
                match dst_map.get_mut(&k) {
                    Some(existing) => deep_merge(existing, v),
                    None => {
                        dst_map.insert(k, v);
                    }
                }
            }
        }
        (dst_slot, src_val) => {
            *dst_slot = src_val;
        }
    }
}

/// Canonicalize JSON by sorting all object keys recursively and emitting compact JSON.
fn canonicalize_json(v: &Value) -> String {
    let sorted = sort_keys(v);
    serde_json::to_string(&sorted).expect("json serialization must not fail")
}

fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut new = serde_json::Map::new();
            for k in keys {
                new.insert(k.clone(), sort_keys(&map[&k]));
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        _ => v.clone(),
    }
}

/// Per-deployment settings, read from the environment (and `.env` via
/// `dotenvy` in `main.rs`). Mirrors the fields the platform's original
/// settings object carried, minus the broker-queue fields a Celery-backed
/// deployment needed — scheduling and workers here are in-process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub bind_addr: String,
    pub api_key: Option<String>,
    pub database_url: String,
    pub database_max_connections: u32,
    pub encryption_key: String,
    pub check_execution_timeout_secs: u64,
    pub max_concurrent_checks: usize,
    pub scheduler_poll_interval_secs: u64,
    pub notification_timeout_secs: u64,
}

impl AppConfig {
    pub const ENV_BIND_ADDR: &'static str = "DQ_BIND_ADDR";
    pub const ENV_API_KEY: &'static str = "DQ_API_KEY";
    pub const ENV_DATABASE_URL: &'static str = "DATABASE_URL";

    /// Reads settings from environment variables, falling back to the same
    /// defaults the platform shipped with. `encryption_key` has no default —
    /// callers that need encryption fail fast via `dq-crypto` instead of
    /// silently running with an empty key.
    pub fn from_env() -> Result<Self> {
        Ok(AppConfig {
            app_name: env_or("DQ_APP_NAME", "DQ Platform"),
            bind_addr: env_or(Self::ENV_BIND_ADDR, "0.0.0.0:8080"),
            api_key: std::env::var(Self::ENV_API_KEY).ok(),
            database_url: std::env::var(Self::ENV_DATABASE_URL)
                .context("DATABASE_URL must be set")?,
            database_max_connections: env_or("DQ_DATABASE_MAX_CONNECTIONS", "10").parse()?,
            encryption_key: std::env::var("ENCRYPTION_KEY").unwrap_or_default(),
            check_execution_timeout_secs: env_or("DQ_CHECK_EXECUTION_TIMEOUT_SECS", "300").parse()?,
            max_concurrent_checks: env_or("DQ_MAX_CONCURRENT_CHECKS", "10").parse()?,
            scheduler_poll_interval_secs: env_or("DQ_SCHEDULER_POLL_INTERVAL_SECS", "30").parse()?,
            notification_timeout_secs: env_or("DQ_NOTIFICATION_TIMEOUT_SECS", "10").parse()?,
        })
    }

    pub fn check_execution_timeout(&self) -> Duration {
        Duration::from_secs(self.check_execution_timeout_secs)
    }

    pub fn scheduler_poll_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler_poll_interval_secs)
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_secs(self.notification_timeout_secs)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_sorts_nested_keys() {
        let v = serde_json::json!({"b": 1, "a": {"z": 1, "y": 2}});
        let canonical = canonicalize_json(&v);
        assert_eq!(canonical, r#"{"a":{"y":2,"z":1},"b":1}"#);
    }

    #[test]
    fn deep_merge_overrides_scalars_and_merges_objects() {
        let mut dst = serde_json::json!({"a": 1, "nested": {"x": 1}});
        let src = serde_json::json!({"a": 2, "nested": {"y": 2}});
        deep_merge(&mut dst, src);
        assert_eq!(dst, serde_json::json!({"a": 2, "nested": {"x": 1, "y": 2}}));
    }
}
