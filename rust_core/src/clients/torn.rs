//! Torn API Client
//!
//! HTTP implementation of `MarketApi`. The upstream API enforces a request
//! rate limit, so every request waits until at least `min_request_interval`
//! has passed since the previous one completed.

use super::error::ApiError;
use super::market_api::MarketApi;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.torn.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 700;

/// Connection settings for `TornClient`
#[derive(Debug, Clone)]
pub struct TornClientConfig {
    pub api_key: String,
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Minimum gap between consecutive requests
    pub min_request_interval: Duration,
}

impl TornClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            min_request_interval: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
        }
    }
}

/// Rate-paced Torn API client
pub struct TornClient {
    client: Client,
    base_url: String,
    api_key: String,
    min_request_interval: Duration,
    /// When the previous request finished
    last_request: Mutex<Option<Instant>>,
}

impl TornClient {
    pub fn new(config: TornClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("MarketSampler/1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            min_request_interval: config.min_request_interval,
            last_request: Mutex::new(None),
        })
    }

    fn item_market_path(item_id: u64) -> String {
        format!("v2/market/{}", item_id)
    }

    fn seller_inventory_path(seller_id: u64) -> String {
        format!("user/{}", seller_id)
    }

    /// Run `request` once the gap since the previous request's completion has
    /// elapsed. The slot stays held until `request` finishes.
    async fn paced<T>(&self, request: impl Future<Output = T>) -> T {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_request_interval {
                sleep(self.min_request_interval - elapsed).await;
            }
        }
        let output = request.await;
        *last = Some(Instant::now());
        output
    }

    async fn get_json(&self, path: &str, selections: &str) -> Result<Value> {
        self.paced(self.send(path, selections)).await
    }

    async fn send(&self, path: &str, selections: &str) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {} (selections={})", url, selections);

        // reqwest errors carry the URL, which includes the key
        let response = self
            .client
            .get(&url)
            .query(&[("selections", selections), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ApiError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ApiError::Http(e.without_url()))?;

        if let Some(err) = ApiError::from_payload(&payload) {
            return Err(err.into());
        }

        Ok(payload)
    }
}

#[async_trait]
impl MarketApi for TornClient {
    fn provider_name(&self) -> &str {
        "Torn"
    }

    async fn fetch_item_market(&self, item_id: u64) -> Result<Value> {
        self.get_json(&Self::item_market_path(item_id), "itemmarket,bazaar")
            .await
            .with_context(|| format!("item market request for item {}", item_id))
    }

    async fn fetch_seller_inventory(&self, seller_id: u64) -> Result<Value> {
        self.get_json(&Self::seller_inventory_path(seller_id), "bazaar")
            .await
            .with_context(|| format!("bazaar request for seller {}", seller_id))
    }

    async fn fetch_aggregate_market(&self) -> Result<Value> {
        self.get_json("market/", "pointsmarket")
            .await
            .context("points market request")
    }
}
