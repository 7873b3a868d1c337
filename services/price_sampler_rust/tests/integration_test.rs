//! Sampler Integration Tests
//!
//! Full runs against a scripted market API and a temporary history file.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use market_sampler_core::{Catalog, CatalogEntry, CatalogGroup, HistoryStore, MarketApi, Snapshot};
use price_sampler_rust::{PriceSampler, SamplerConfig};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct ScriptedApi {
    items: HashMap<u64, Value>,
    sellers: HashMap<u64, Value>,
    aggregate: Option<Value>,
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl MarketApi for ScriptedApi {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn fetch_item_market(&self, item_id: u64) -> Result<Value> {
        self.calls.lock().unwrap().push(format!("item:{}", item_id));
        self.items
            .get(&item_id)
            .cloned()
            .ok_or_else(|| anyhow!("timed out"))
    }

    async fn fetch_seller_inventory(&self, seller_id: u64) -> Result<Value> {
        self.calls.lock().unwrap().push(format!("seller:{}", seller_id));
        self.sellers
            .get(&seller_id)
            .cloned()
            .ok_or_else(|| anyhow!("timed out"))
    }

    async fn fetch_aggregate_market(&self) -> Result<Value> {
        self.calls.lock().unwrap().push("aggregate".to_string());
        self.aggregate.clone().ok_or_else(|| anyhow!("timed out"))
    }
}

fn two_item_catalog() -> Catalog {
    Catalog::new(vec![CatalogGroup {
        name: "Set".to_string(),
        entries: vec![CatalogEntry::new("A", 1), CatalogEntry::new("B", 2)],
    }])
    .unwrap()
}

fn temp_history_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("sampler-it-{}", uuid::Uuid::new_v4()))
        .join("price_history.json")
}

fn config(history_path: PathBuf, window: usize) -> SamplerConfig {
    let mut config = SamplerConfig::with_api_key("test-key");
    config.history_path = history_path;
    config.history_window = window;
    config.source = "integration-test".to_string();
    config
}

fn old_snapshot(timestamp: i64) -> Snapshot {
    Snapshot {
        timestamp,
        aggregate_price: 40.0,
        primary_prices: BTreeMap::from([("A".to_string(), 90.0)]),
        secondary_prices: BTreeMap::new(),
        source: "earlier-run".to_string(),
    }
}

fn cleanup(path: &Path) {
    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[tokio::test]
async fn test_run_average_price_and_error_item() {
    let mut api = ScriptedApi::default();
    api.items.insert(1, json!({"itemmarket": {"item": {"average_price": 100}}}));
    api.items.insert(2, json!({"error": {"code": 2, "error": "Incorrect key"}}));
    api.aggregate = Some(json!({"pointsmarket": {
        "1": {"cost": 10, "quantity": 3},
        "2": {"cost": 20, "quantity": 1},
        "3": {"cost": 30, "quantity": 9}
    }}));
    let api = Arc::new(api);

    let path = temp_history_path();
    let sampler = PriceSampler::new(config(path.clone(), 10), two_item_catalog(), api.clone());
    let snapshot = sampler.run().await.unwrap();

    assert_eq!(snapshot.primary_prices, BTreeMap::from([("A".to_string(), 100.0)]));
    assert!(snapshot.secondary_prices.is_empty());
    assert_eq!(snapshot.aggregate_price, 20.0);
    assert_eq!(snapshot.source, "integration-test");

    // No seller lookups: neither item listed a bazaar seller
    assert_eq!(
        *api.calls.lock().unwrap(),
        vec!["item:1".to_string(), "item:2".to_string(), "aggregate".to_string()]
    );

    let stored = HistoryStore::new(path.clone()).load();
    assert_eq!(stored, vec![snapshot]);
    cleanup(&path);
}

#[tokio::test]
async fn test_run_rolls_window() {
    let path = temp_history_path();
    let store = HistoryStore::new(path.clone());
    store
        .save(&[old_snapshot(1), old_snapshot(2), old_snapshot(3)])
        .unwrap();

    let mut api = ScriptedApi::default();
    api.items.insert(
        1,
        json!({
            "itemmarket": {"listings": [{"price": 105}, {"price": 101}]},
            "bazaar": {"specialized": [{"id": 500, "is_open": false}, {"id": 501}]}
        }),
    );
    api.sellers.insert(501, json!({"bazaar": [{"ID": 1, "price": 99}, {"ID": 2, "price": 5}]}));
    let api = Arc::new(api);

    let sampler = PriceSampler::new(config(path.clone(), 3), two_item_catalog(), api.clone());
    let snapshot = sampler.run().await.unwrap();

    assert_eq!(snapshot.primary_prices.get("A"), Some(&101.0));
    assert_eq!(snapshot.secondary_prices.get("A"), Some(&99.0));
    assert_eq!(snapshot.aggregate_price, 0.0);

    let stored = store.load();
    let timestamps: Vec<i64> = stored.iter().map(|s| s.timestamp).collect();
    assert_eq!(timestamps, vec![2, 3, snapshot.timestamp]);
    assert_eq!(stored.last(), Some(&snapshot));
    cleanup(&path);
}

#[tokio::test]
async fn test_run_replaces_corrupt_history() {
    let path = temp_history_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "\"not an array\"").unwrap();

    let api = Arc::new(ScriptedApi::default());
    let sampler = PriceSampler::new(config(path.clone(), 5), two_item_catalog(), api);
    let snapshot = sampler.run().await.unwrap();

    assert!(snapshot.primary_prices.is_empty());
    assert_eq!(HistoryStore::new(path.clone()).load(), vec![snapshot]);
    cleanup(&path);
}

#[tokio::test]
async fn test_run_fails_when_history_cannot_be_written() {
    // A directory sitting where the history file should go
    let path = temp_history_path();
    std::fs::create_dir_all(&path).unwrap();

    let api = Arc::new(ScriptedApi::default());
    let sampler = PriceSampler::new(config(path.clone(), 5), two_item_catalog(), api);

    assert!(sampler.run().await.is_err());
    cleanup(&path);
}
