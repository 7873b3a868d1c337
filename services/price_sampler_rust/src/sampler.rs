//! One sampling run: load history, sample the catalog, append, save.

use crate::config::SamplerConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use market_sampler_core::{append_and_trim, build_snapshot, Catalog, HistoryStore, MarketApi, Snapshot};
use std::sync::Arc;
use tracing::info;

pub struct PriceSampler {
    config: SamplerConfig,
    catalog: Catalog,
    api: Arc<dyn MarketApi>,
    store: HistoryStore,
}

impl PriceSampler {
    pub fn new(config: SamplerConfig, catalog: Catalog, api: Arc<dyn MarketApi>) -> Self {
        let store = HistoryStore::new(config.history_path.clone());
        Self {
            config,
            catalog,
            api,
            store,
        }
    }

    /// Execute one run and return the appended snapshot.
    ///
    /// Only a failure to persist the history is an error; the previous file is
    /// left untouched in that case.
    pub async fn run(&self) -> Result<Snapshot> {
        let history = self.store.load();
        info!(
            "Loaded {} snapshots from {} (window {})",
            history.len(),
            self.store.path().display(),
            self.config.history_window
        );

        info!(
            "Sampling {} items via {}",
            self.catalog.len(),
            self.api.provider_name()
        );
        let snapshot = build_snapshot(&self.catalog, self.api.as_ref(), &self.config.source).await;

        let history = append_and_trim(history, snapshot.clone(), self.config.history_window);
        self.store
            .save(&history)
            .with_context(|| format!("Failed to save history to {}", self.store.path().display()))?;

        let taken_at = DateTime::<Utc>::from_timestamp_millis(snapshot.timestamp)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| snapshot.timestamp.to_string());
        info!(
            "Saved snapshot {} ({} market, {} bazaar prices); history holds {}",
            taken_at,
            snapshot.primary_prices.len(),
            snapshot.secondary_prices.len(),
            history.len()
        );

        Ok(snapshot)
    }
}
