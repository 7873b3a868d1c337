//! Price resolvers
//!
//! Turns raw payloads into one price per item and market:
//! - item market: server-reported average, else the cheapest listing
//! - bazaar: cheapest matching listing of the first candidate seller
//! - points market: rounded mean of the cheapest available offers

use super::listings::{coerce_id, extract_cost, item_id_of, lookup, min_cost, normalize};
use crate::clients::{ApiError, MarketApi};
use serde_json::Value;
use tracing::{debug, warn};

/// Number of cheapest offers averaged into the aggregate price
pub const AGGREGATE_SAMPLE_SIZE: usize = 5;

/// Where a server-reported average may live, most specific first
const AVERAGE_PRICE_PATHS: &[&[&str]] = &[
    &["itemmarket", "item", "average_price"],
    &["itemmarket", "average_price"],
    &["average_price"],
];

/// Where the peer seller directory may live
const SELLER_DIRECTORY_PATHS: &[&[&str]] = &[&["bazaar", "specialized"], &["specialized"]];

const SELLER_ID_FIELDS: &[&str] = &["id", "ID", "user_id"];

/// Availability fields on aggregate market offers
const AVAILABILITY_FIELDS: &[&str] = &["quantity", "amount"];

/// Item market price plus candidate bazaar sellers for one item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimaryQuote {
    pub price: Option<f64>,
    pub seller_ids: Vec<u64>,
}

/// Resolve the item market price and peer seller candidates.
///
/// An API error payload yields an empty quote; the caller decides how loudly
/// to report it.
pub fn resolve_primary(payload: &Value) -> PrimaryQuote {
    if ApiError::from_payload(payload).is_some() {
        return PrimaryQuote::default();
    }

    let price = reported_average(payload).or_else(|| min_cost(normalize(payload)));

    PrimaryQuote {
        price,
        seller_ids: peer_seller_ids(payload),
    }
}

fn reported_average(payload: &Value) -> Option<f64> {
    AVERAGE_PRICE_PATHS
        .iter()
        .filter_map(|path| lookup(payload, path).and_then(Value::as_f64))
        .find(|avg| *avg > 0.0)
}

/// Open sellers from the bazaar directory, in listed order
pub fn peer_seller_ids(payload: &Value) -> Vec<u64> {
    SELLER_DIRECTORY_PATHS
        .iter()
        .find_map(|path| lookup(payload, path).and_then(Value::as_array))
        .map(|entries| entries.iter().filter_map(seller_id).collect())
        .unwrap_or_default()
}

fn seller_id(entry: &Value) -> Option<u64> {
    match entry {
        Value::Object(obj) => {
            if obj.get("is_open").and_then(Value::as_bool) == Some(false) {
                return None;
            }
            SELLER_ID_FIELDS
                .iter()
                .filter_map(|field| obj.get(*field))
                .find_map(coerce_id)
        }
        Value::Number(_) | Value::String(_) => coerce_id(entry),
        _ => None,
    }
}

/// Resolve the bazaar price for `item_id`.
///
/// Only the first candidate seller is queried, which caps a run at two
/// requests per item. Failures are logged and yield `None`.
pub async fn resolve_secondary(api: &dyn MarketApi, seller_ids: &[u64], item_id: u64) -> Option<f64> {
    let seller_id = *seller_ids.first()?;

    let inventory = match api.fetch_seller_inventory(seller_id).await {
        Ok(inventory) => inventory,
        Err(e) => {
            warn!(
                "{} bazaar lookup failed for seller {} (item {}): {:#}",
                api.provider_name(),
                seller_id,
                item_id,
                e
            );
            return None;
        }
    };

    if let Some(err) = ApiError::from_payload(&inventory) {
        warn!("Bazaar of seller {} returned {} (item {})", seller_id, err, item_id);
        return None;
    }

    let price = lowest_matching_cost(&inventory, item_id);
    if price.is_none() {
        debug!("Seller {} lists no priced entry for item {}", seller_id, item_id);
    }
    price
}

/// Cheapest entry in a seller inventory whose id matches `item_id`
pub fn lowest_matching_cost(inventory: &Value, item_id: u64) -> Option<f64> {
    min_cost(
        inventory_entries(inventory)
            .into_iter()
            .filter(|entry| item_id_of(entry) == Some(item_id)),
    )
}

fn inventory_entries(inventory: &Value) -> Vec<&Value> {
    match inventory {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => match obj.get("bazaar") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(Value::Object(inner)) => inner.values().filter(|v| v.is_object()).collect(),
            _ => obj.values().filter(|v| v.is_object()).collect(),
        },
        _ => Vec::new(),
    }
}

/// Rounded mean cost of the cheapest available aggregate-market offers.
///
/// Always a number: no usable offers gives `0.0`.
pub fn resolve_aggregate(payload: &Value) -> f64 {
    let section = payload.get("pointsmarket").unwrap_or(payload);

    let offers: Vec<&Value> = match section {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => obj.values().filter(|v| v.is_object()).collect(),
        _ => Vec::new(),
    };

    let mut costs: Vec<f64> = offers
        .into_iter()
        .filter(|offer| availability(offer) > 0.0)
        .filter_map(extract_cost)
        .collect();

    if costs.is_empty() {
        return 0.0;
    }

    costs.sort_by(f64::total_cmp);
    costs.truncate(AGGREGATE_SAMPLE_SIZE);

    (costs.iter().sum::<f64>() / costs.len() as f64).round()
}

fn availability(offer: &Value) -> f64 {
    AVAILABILITY_FIELDS
        .iter()
        .find_map(|field| offer.get(*field).and_then(Value::as_f64))
        .unwrap_or(0.0)
}
