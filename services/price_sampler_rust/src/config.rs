//! Configuration for price_sampler_rust

use anyhow::{anyhow, Result};
use market_sampler_core::clients::torn::{
    DEFAULT_BASE_URL, DEFAULT_REQUEST_DELAY_MS, DEFAULT_TIMEOUT_SECS,
};
use market_sampler_core::TornClientConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HISTORY_PATH: &str = "data/price_history.json";
pub const DEFAULT_HISTORY_WINDOW: usize = 500;
pub const DEFAULT_SNAPSHOT_SOURCE: &str = "scheduled-sampler";

#[derive(Debug, Clone)]
pub struct SamplerConfig {
    // Upstream API
    pub api_key: String,
    pub base_url: String,
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,

    // History
    pub history_path: PathBuf,
    pub history_window: usize,

    // Snapshot provenance
    pub source: String,

    // Optional catalog override
    pub catalog_path: Option<PathBuf>,
}

impl SamplerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process env
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("TORN_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow!("TORN_API_KEY must be set"))?;

        let history_window = parse_usize(&lookup, "HISTORY_WINDOW", DEFAULT_HISTORY_WINDOW)?;
        if history_window == 0 {
            return Err(anyhow!("HISTORY_WINDOW must be >= 1"));
        }

        Ok(Self {
            api_key,

            base_url: lookup("MARKET_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),

            request_delay_ms: parse_u64(&lookup, "REQUEST_DELAY_MS", DEFAULT_REQUEST_DELAY_MS)?,
            request_timeout_secs: parse_u64(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,

            history_path: lookup("HISTORY_PATH")
                .unwrap_or_else(|| DEFAULT_HISTORY_PATH.to_string())
                .into(),
            history_window,

            source: lookup("SNAPSHOT_SOURCE")
                .unwrap_or_else(|| DEFAULT_SNAPSHOT_SOURCE.to_string()),

            catalog_path: lookup("CATALOG_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    /// Config with defaults for everything but the key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            history_window: DEFAULT_HISTORY_WINDOW,
            source: DEFAULT_SNAPSHOT_SOURCE.to_string(),
            catalog_path: None,
        }
    }

    pub fn client_config(&self) -> TornClientConfig {
        TornClientConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            min_request_interval: Duration::from_millis(self.request_delay_ms),
        }
    }
}

/// Parse a variable as u64 with default fallback
fn parse_u64(lookup: impl Fn(&str) -> Option<String>, var_name: &str, default: u64) -> Result<u64> {
    match lookup(var_name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|_| anyhow!("{} must be a valid u64", var_name)),
        None => Ok(default),
    }
}

/// Parse a variable as usize with default fallback
fn parse_usize(lookup: impl Fn(&str) -> Option<String>, var_name: &str, default: usize) -> Result<usize> {
    match lookup(var_name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|_| anyhow!("{} must be a valid usize", var_name)),
        None => Ok(default),
    }
}
