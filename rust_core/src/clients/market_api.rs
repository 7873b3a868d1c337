//! Market API Trait
//!
//! The three upstream requests a sampling run needs. Implementations return
//! the raw JSON payload; shape interpretation lives in `crate::pricing`.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Source of raw market payloads
///
/// Implementations must be Send + Sync for use in async contexts.
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Display name used in log lines
    fn provider_name(&self) -> &str;

    /// Open-market listings plus the peer seller directory for one item
    async fn fetch_item_market(&self, item_id: u64) -> Result<Value>;

    /// Full peer-market inventory of one seller
    async fn fetch_seller_inventory(&self, seller_id: u64) -> Result<Value>;

    /// The auxiliary market used for the aggregate price
    async fn fetch_aggregate_market(&self) -> Result<Value>;
}
