// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the control crate
//! (SPEC_FULL §6.1 "resolved through a centralized env module per binary").

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use smol_str::SmolStr;

/// Heartbeat interval H (spec §4.3, §4.5, §4.10). Node staleness and peer
/// staleness multipliers are fixed at `3H`/`10H` in `orc-core`.
pub fn heartbeat_interval() -> Duration {
    std::env::var("ORC_HEARTBEAT_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(10))
}

/// Terminal-job ephemeral-index TTL (SPEC_FULL §4.1, default 1h).
pub fn job_index_ttl() -> Duration {
    std::env::var("ORC_JOB_TTL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(3600))
}

/// Per-dispatch cost unit used by the advisory cost-ceiling pre-check
/// (SPEC_FULL §4.1). Multiplied by the selected-node/step count.
pub fn cost_unit() -> f64 {
    std::env::var("ORC_COST_UNIT")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(1.0)
}

/// Slack factor applied to `cost_ceiling` before rejecting a submission.
pub fn cost_slack_factor() -> f64 {
    std::env::var("ORC_COST_SLACK_FACTOR")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(1.25)
}

/// This replica's id, published on `orchestrator.heartbeat` (spec §4.5).
pub fn replica_id() -> SmolStr {
    std::env::var("ORC_REPLICA_ID")
        .ok()
        .map(SmolStr::from)
        .unwrap_or_else(|| SmolStr::new("r1"))
}

/// This replica's advertised endpoint, for peer-to-peer forwarding.
pub fn replica_endpoint() -> SmolStr {
    std::env::var("ORC_REPLICA_ENDPOINT")
        .ok()
        .map(SmolStr::from)
        .unwrap_or_else(|| SmolStr::new("127.0.0.1:7500"))
}

/// Declared capacity (concurrent jobs) used for handoff load fractions.
pub fn replica_capacity() -> u32 {
    std::env::var("ORC_REPLICA_CAPACITY")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(16)
}

/// HTTP bind address for `orc-orchestratord`.
pub fn http_bind_addr() -> String {
    std::env::var("ORC_HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
}

/// Local write-ahead log path.
pub fn wal_path() -> PathBuf {
    std::env::var("ORC_WAL_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./orc-control.wal"))
}

/// Local content-addressed blob store root.
pub fn blob_root() -> PathBuf {
    std::env::var("ORC_BLOB_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./orc-blobs"))
}

/// Local mutable-name registry file.
pub fn registry_path() -> PathBuf {
    std::env::var("ORC_REGISTRY_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./orc-registry.json"))
}

/// Structured values that don't fit a single env var cleanly (peer seed
/// list, per-priority rate limits) come from an optional TOML file
/// (SPEC_FULL §6.1 "a TOML file layer for structured values").
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub peer_seeds: Vec<String>,
    #[serde(default)]
    pub rate_limits: RateLimits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimits {
    #[serde(default = "RateLimits::default_high")]
    pub high: u32,
    #[serde(default = "RateLimits::default_normal")]
    pub normal: u32,
    #[serde(default = "RateLimits::default_low")]
    pub low: u32,
}

impl RateLimits {
    fn default_high() -> u32 {
        120
    }
    fn default_normal() -> u32 {
        60
    }
    fn default_low() -> u32 {
        20
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            high: Self::default_high(),
            normal: Self::default_normal(),
            low: Self::default_low(),
        }
    }
}

/// Path to the optional TOML config layer, via `ORC_CONFIG_PATH`.
pub fn config_path() -> Option<PathBuf> {
    std::env::var("ORC_CONFIG_PATH").ok().map(PathBuf::from)
}

/// Load the TOML layer if `ORC_CONFIG_PATH` is set and the file exists;
/// otherwise fall back to defaults. Malformed TOML is a startup error, a
/// missing file is not.
pub fn load_toml_config() -> Result<TomlConfig, ConfigError> {
    let Some(path) = config_path() else {
        return Ok(TomlConfig::default());
    };
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(TomlConfig::default()),
        Err(err) => return Err(ConfigError::Io(err)),
    };
    toml::from_str(&contents).map_err(ConfigError::Toml)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config file: {0}")]
    Io(#[source] std::io::Error),
    #[error("parsing config file: {0}")]
    Toml(#[from] toml::de::Error),
}
