//! Listing normalization and cost extraction
//!
//! Market endpoints do not agree on what "a list of listings" looks like. A
//! section may be a bare array, an object carrying a `listings` array, an
//! object nesting the array under a container name, or a keyed map of
//! records. Everything here works on raw `serde_json::Value` trees.

use serde_json::{Map, Value};

/// Candidate cost fields, highest priority first
pub const COST_FIELDS: &[&str] = &["price", "cost", "amount", "value"];

/// Container names searched after a top-level `listings` field
pub const LISTING_CONTAINERS: &[&str] = &["itemmarket", "market", "items", "data"];

/// Candidate item identifier fields on inventory entries
pub const ITEM_ID_FIELDS: &[&str] = &["ID", "id", "item_id"];

/// Flatten a market section into listing-like records.
///
/// Returns borrowed records; an unrecognized shape yields an empty vector.
pub fn normalize(section: &Value) -> Vec<&Value> {
    match section {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => normalize_object(map),
        _ => Vec::new(),
    }
}

fn normalize_object(map: &Map<String, Value>) -> Vec<&Value> {
    if let Some(Value::Array(listings)) = map.get("listings") {
        return listings.iter().collect();
    }

    for container in LISTING_CONTAINERS {
        match map.get(*container) {
            Some(Value::Array(items)) => return items.iter().collect(),
            Some(Value::Object(inner)) => {
                if let Some(Value::Array(listings)) = inner.get("listings") {
                    return listings.iter().collect();
                }
            }
            _ => {}
        }
    }

    // Keyed map of records. Metadata objects have no cost field, so at least
    // one value must look like a listing before the map is accepted.
    let records: Vec<&Value> = map.values().filter(|v| v.is_object()).collect();
    if records.iter().any(|record| looks_like_listing(record)) {
        records
    } else {
        Vec::new()
    }
}

/// True when the record carries at least one recognized cost field
pub fn looks_like_listing(record: &Value) -> bool {
    record
        .as_object()
        .map(|obj| COST_FIELDS.iter().any(|field| obj.contains_key(*field)))
        .unwrap_or(false)
}

/// First strictly positive numeric cost, in `COST_FIELDS` order
pub fn extract_cost(record: &Value) -> Option<f64> {
    let obj = record.as_object()?;
    COST_FIELDS
        .iter()
        .filter_map(|field| obj.get(*field).and_then(Value::as_f64))
        .find(|cost| *cost > 0.0)
}

/// Minimum extractable cost across records
pub fn min_cost<'a, I>(records: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Value>,
{
    records
        .into_iter()
        .filter_map(extract_cost)
        .fold(None, |lowest, cost| match lowest {
            Some(current) if current <= cost => Some(current),
            _ => Some(cost),
        })
}

/// Coerce a JSON number or numeric string into a positive integer id
pub fn coerce_id(value: &Value) -> Option<u64> {
    let id = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f > 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    (id > 0).then_some(id)
}

/// Item identifier of an inventory entry, tried across `ITEM_ID_FIELDS`
pub fn item_id_of(entry: &Value) -> Option<u64> {
    let obj = entry.as_object()?;
    ITEM_ID_FIELDS
        .iter()
        .filter_map(|field| obj.get(*field))
        .find_map(coerce_id)
}

/// Walk a key path through nested objects
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, key| node.get(*key))
}
