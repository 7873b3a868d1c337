// Shared models for the market sampler
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

// ============================================================================
// Catalog
// ============================================================================

/// One tracked item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub item_id: u64,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, item_id: u64) -> Self {
        Self {
            name: name.into(),
            item_id,
        }
    }
}

/// Named sub-group of the catalog, reported on as a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogGroup {
    pub name: String,
    #[serde(rename = "items")]
    pub entries: Vec<CatalogEntry>,
}

/// Fixed, ordered set of tracked items. Names and ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    groups: Vec<CatalogGroup>,
}

impl Catalog {
    pub fn new(groups: Vec<CatalogGroup>) -> Result<Self> {
        let mut names = HashSet::new();
        let mut ids = HashSet::new();

        for group in &groups {
            for entry in &group.entries {
                if entry.name.trim().is_empty() {
                    bail!("catalog group '{}' has an entry with an empty name", group.name);
                }
                if entry.item_id == 0 {
                    bail!("catalog item '{}' must have a positive id", entry.name);
                }
                if !names.insert(entry.name.as_str()) {
                    bail!("duplicate catalog item name '{}'", entry.name);
                }
                if !ids.insert(entry.item_id) {
                    bail!("duplicate catalog item id {}", entry.item_id);
                }
            }
        }

        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[CatalogGroup] {
        &self.groups
    }

    /// All entries in catalog order
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.groups.iter().flat_map(|g| g.entries.iter())
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// The two per-item markets a snapshot records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    /// Open item market
    ItemMarket,
    /// Peer-to-peer seller market
    Bazaar,
}

impl Market {
    pub const ALL: [Market; 2] = [Market::ItemMarket, Market::Bazaar];
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::ItemMarket => write!(f, "item market"),
            Market::Bazaar => write!(f, "bazaar"),
        }
    }
}

/// One timestamped sample of the whole catalog.
///
/// Items without a resolved price are absent from the maps; zero never
/// stands in for "unknown".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub aggregate_price: f64,
    pub primary_prices: BTreeMap<String, f64>,
    pub secondary_prices: BTreeMap<String, f64>,
    /// Which automated run produced the sample
    pub source: String,
}

impl Snapshot {
    pub fn prices(&self, market: Market) -> &BTreeMap<String, f64> {
        match market {
            Market::ItemMarket => &self.primary_prices,
            Market::Bazaar => &self.secondary_prices,
        }
    }
}
