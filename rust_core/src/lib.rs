//! Market Sampler Core - price normalization and rolling snapshot history.
//!
//! This module provides:
//! - Listing normalization for the many shapes a market section can take
//! - Cost extraction from loosely structured listing records
//! - Item market, bazaar and aggregate (points) market price resolvers
//! - A rate-paced HTTP client for the upstream market API
//! - Snapshot assembly with per-group completeness reporting
//! - A bounded, append-only snapshot history persisted as one JSON file

pub mod clients;
pub mod history;
pub mod models;
pub mod pricing;
pub mod snapshot;

pub use clients::{ApiError, MarketApi, TornClient, TornClientConfig};
pub use history::{append_and_trim, HistoryStore};
pub use models::{Catalog, CatalogEntry, CatalogGroup, Market, Snapshot};
pub use snapshot::{build_snapshot, summarize, GroupSummary};
