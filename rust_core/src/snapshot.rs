//! Snapshot Builder
//!
//! Walks the catalog in order, resolving both markets for every item, then
//! samples the aggregate market once and stamps the result.

use crate::clients::{ApiError, MarketApi};
use crate::models::{Catalog, CatalogEntry, Market, Snapshot};
use crate::pricing::{resolve_aggregate, resolve_primary, resolve_secondary, PrimaryQuote};
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Sample every catalog item and the aggregate market into one snapshot.
///
/// Requests are issued one at a time in catalog order. Per-item failures
/// degrade that item to "no price" and never abort the run.
pub async fn build_snapshot(catalog: &Catalog, api: &dyn MarketApi, source: &str) -> Snapshot {
    let mut primary_prices = BTreeMap::new();
    let mut secondary_prices = BTreeMap::new();
    let total = catalog.len();

    for (index, entry) in catalog.entries().enumerate() {
        let quote = fetch_primary(api, entry).await;

        let secondary = if quote.seller_ids.is_empty() {
            None
        } else {
            resolve_secondary(api, &quote.seller_ids, entry.item_id).await
        };

        info!(
            "[{}/{}] {} (#{}): market={} bazaar={}",
            index + 1,
            total,
            entry.name,
            entry.item_id,
            format_price(quote.price),
            format_price(secondary)
        );

        if let Some(price) = quote.price {
            primary_prices.insert(entry.name.clone(), price);
        }
        if let Some(price) = secondary {
            secondary_prices.insert(entry.name.clone(), price);
        }
    }

    let aggregate_price = fetch_aggregate(api).await;
    info!("Aggregate price: {}", aggregate_price);

    let snapshot = Snapshot {
        timestamp: Utc::now().timestamp_millis(),
        aggregate_price,
        primary_prices,
        secondary_prices,
        source: source.to_string(),
    };

    for summary in summarize(catalog, &snapshot) {
        summary.log(snapshot.aggregate_price);
    }

    snapshot
}

async fn fetch_primary(api: &dyn MarketApi, entry: &CatalogEntry) -> PrimaryQuote {
    match api.fetch_item_market(entry.item_id).await {
        Ok(payload) => {
            if let Some(err) = ApiError::from_payload(&payload) {
                warn!("{} (#{}): {}", entry.name, entry.item_id, err);
            }
            resolve_primary(&payload)
        }
        Err(e) => {
            warn!(
                "{} (#{}): {} item market request failed: {:#}",
                entry.name,
                entry.item_id,
                api.provider_name(),
                e
            );
            PrimaryQuote::default()
        }
    }
}

async fn fetch_aggregate(api: &dyn MarketApi) -> f64 {
    match api.fetch_aggregate_market().await {
        Ok(payload) => {
            if let Some(err) = ApiError::from_payload(&payload) {
                warn!("Aggregate market returned {}", err);
                return 0.0;
            }
            resolve_aggregate(&payload)
        }
        Err(e) => {
            warn!("Aggregate market request failed: {:#}", e);
            0.0
        }
    }
}

fn format_price(price: Option<f64>) -> String {
    price
        .map(|p| format!("{:.0}", p))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Completeness of one catalog group in one market
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub group: String,
    pub market: Market,
    /// Sum of member prices; only set when every member has a price
    pub total: Option<f64>,
    /// Members without a price, in catalog order
    pub missing: Vec<String>,
}

impl GroupSummary {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Report the group, expressing complete totals in aggregate units too
    pub fn log(&self, aggregate_price: f64) {
        match self.total {
            Some(total) if aggregate_price > 0.0 => info!(
                "{} [{}]: COMPLETE total={:.0} ({:.1} at aggregate price {:.0})",
                self.group,
                self.market,
                total,
                total / aggregate_price,
                aggregate_price
            ),
            Some(total) => info!("{} [{}]: COMPLETE total={:.0}", self.group, self.market, total),
            None => warn!(
                "{} [{}]: INCOMPLETE missing=[{}]",
                self.group,
                self.market,
                self.missing.join(", ")
            ),
        }
    }
}

/// Per-group, per-market completeness of a snapshot
pub fn summarize(catalog: &Catalog, snapshot: &Snapshot) -> Vec<GroupSummary> {
    let mut summaries = Vec::with_capacity(catalog.groups().len() * Market::ALL.len());

    for group in catalog.groups() {
        for market in Market::ALL {
            let prices = snapshot.prices(market);
            let missing: Vec<String> = group
                .entries
                .iter()
                .filter(|entry| !prices.get(&entry.name).is_some_and(|p| *p > 0.0))
                .map(|entry| entry.name.clone())
                .collect();

            let total = missing.is_empty().then(|| {
                group
                    .entries
                    .iter()
                    .filter_map(|entry| prices.get(&entry.name))
                    .sum::<f64>()
            });

            summaries.push(GroupSummary {
                group: group.name.clone(),
                market,
                total,
                missing,
            });
        }
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogEntry, CatalogGroup};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedApi {
        items: HashMap<u64, Value>,
        sellers: HashMap<u64, Value>,
        aggregate: Option<Value>,
        seller_calls: Mutex<Vec<u64>>,
    }

    #[async_trait]
    impl MarketApi for ScriptedApi {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn fetch_item_market(&self, item_id: u64) -> Result<Value> {
            self.items
                .get(&item_id)
                .cloned()
                .ok_or_else(|| anyhow!("connection reset"))
        }

        async fn fetch_seller_inventory(&self, seller_id: u64) -> Result<Value> {
            self.seller_calls.lock().unwrap().push(seller_id);
            self.sellers
                .get(&seller_id)
                .cloned()
                .ok_or_else(|| anyhow!("timeout"))
        }

        async fn fetch_aggregate_market(&self) -> Result<Value> {
            self.aggregate.clone().ok_or_else(|| anyhow!("timeout"))
        }
    }

    fn group(name: &str, entries: &[(&str, u64)]) -> CatalogGroup {
        CatalogGroup {
            name: name.to_string(),
            entries: entries
                .iter()
                .map(|(n, id)| CatalogEntry::new(*n, *id))
                .collect(),
        }
    }

    fn catalog(groups: Vec<CatalogGroup>) -> Catalog {
        Catalog::new(groups).unwrap()
    }

    #[tokio::test]
    async fn test_build_snapshot_average_and_error() {
        let mut api = ScriptedApi::default();
        api.items.insert(1, json!({"itemmarket": {"item": {"average_price": 100}}}));
        api.items.insert(2, json!({"error": {"code": 2, "error": "Incorrect key"}}));

        let catalog = catalog(vec![group("Set", &[("A", 1), ("B", 2)])]);
        let snapshot = build_snapshot(&catalog, &api, "test-run").await;

        assert_eq!(snapshot.primary_prices, BTreeMap::from([("A".to_string(), 100.0)]));
        assert!(snapshot.secondary_prices.is_empty());
        assert!(api.seller_calls.lock().unwrap().is_empty());
        assert_eq!(snapshot.aggregate_price, 0.0);
        assert_eq!(snapshot.source, "test-run");
        assert!(snapshot.timestamp > 0);
    }

    #[tokio::test]
    async fn test_build_snapshot_resolves_bazaar_and_aggregate() {
        let mut api = ScriptedApi::default();
        api.items.insert(
            260,
            json!({
                "itemmarket": {"listings": [{"price": 1000}, {"price": 980}]},
                "bazaar": {"specialized": [{"id": 77, "is_open": true}, {"id": 78}]}
            }),
        );
        api.sellers.insert(77, json!({"bazaar": [{"ID": 260, "price": 960}]}));
        api.aggregate = Some(json!({"pointsmarket": {
            "1": {"cost": 10, "quantity": 1},
            "2": {"cost": 20, "quantity": 1},
            "3": {"cost": 30, "quantity": 1}
        }}));

        let catalog = catalog(vec![group("Flowers", &[("Dahlia", 260)])]);
        let snapshot = build_snapshot(&catalog, &api, "test-run").await;

        assert_eq!(snapshot.primary_prices.get("Dahlia"), Some(&980.0));
        assert_eq!(snapshot.secondary_prices.get("Dahlia"), Some(&960.0));
        assert_eq!(snapshot.aggregate_price, 20.0);
        assert_eq!(*api.seller_calls.lock().unwrap(), vec![77]);
    }

    #[tokio::test]
    async fn test_build_snapshot_survives_transport_errors() {
        let api = ScriptedApi::default();
        let catalog = catalog(vec![group("Set", &[("A", 1)])]);
        let snapshot = build_snapshot(&catalog, &api, "test-run").await;

        assert!(snapshot.primary_prices.is_empty());
        assert!(snapshot.secondary_prices.is_empty());
        assert_eq!(snapshot.aggregate_price, 0.0);
    }

    #[test]
    fn test_summarize_complete_and_incomplete() {
        let catalog = catalog(vec![
            group("Flowers", &[("Dahlia", 260), ("Orchid", 264)]),
            group("Plushies", &[("Sheep Plushie", 186), ("Kitten Plushie", 215)]),
        ]);
        let snapshot = Snapshot {
            timestamp: 1,
            aggregate_price: 50.0,
            primary_prices: BTreeMap::from([
                ("Dahlia".to_string(), 900.0),
                ("Orchid".to_string(), 700.0),
                ("Sheep Plushie".to_string(), 500.0),
            ]),
            secondary_prices: BTreeMap::from([("Dahlia".to_string(), 880.0)]),
            source: "test".to_string(),
        };

        let summaries = summarize(&catalog, &snapshot);
        assert_eq!(summaries.len(), 4);

        let flowers_market = &summaries[0];
        assert_eq!(flowers_market.market, Market::ItemMarket);
        assert!(flowers_market.is_complete());
        assert_eq!(flowers_market.total, Some(1600.0));

        let flowers_bazaar = &summaries[1];
        assert_eq!(flowers_bazaar.market, Market::Bazaar);
        assert_eq!(flowers_bazaar.total, None);
        assert_eq!(flowers_bazaar.missing, vec!["Orchid".to_string()]);

        let plushies_market = &summaries[2];
        assert!(!plushies_market.is_complete());
        assert_eq!(plushies_market.missing, vec!["Kitten Plushie".to_string()]);

        let plushies_bazaar = &summaries[3];
        assert_eq!(
            plushies_bazaar.missing,
            vec!["Sheep Plushie".to_string(), "Kitten Plushie".to_string()]
        );
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Some(1234.4)), "1234");
        assert_eq!(format_price(None), "n/a");
    }
}
