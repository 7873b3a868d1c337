//! Tracked item catalog
//!
//! The built-in catalog covers the flower and plushie sets. A JSON file of the
//! form `{"Flowers": {"Dahlia": 260, "Orchid": 264}, "Plushies": {...}}`
//! replaces it when `CATALOG_PATH` is set. Group and item order follow the
//! file.

use anyhow::{anyhow, Context, Result};
use market_sampler_core::{Catalog, CatalogEntry, CatalogGroup};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

const FLOWERS: &[(&str, u64)] = &[
    ("Dahlia", 260),
    ("Orchid", 264),
    ("African Violet", 282),
    ("Cherry Blossom", 277),
    ("Peony", 276),
    ("Ceibo Flower", 271),
    ("Edelweiss", 272),
    ("Crocus", 263),
    ("Heather", 267),
    ("Tribulus Omanense", 385),
    ("Banana Orchid", 617),
];

const PLUSHIES: &[(&str, u64)] = &[
    ("Sheep Plushie", 186),
    ("Teddy Bear Plushie", 187),
    ("Kitten Plushie", 215),
    ("Jaguar Plushie", 258),
    ("Wolverine Plushie", 261),
    ("Nessie Plushie", 266),
    ("Red Fox Plushie", 268),
    ("Monkey Plushie", 269),
    ("Chamois Plushie", 273),
    ("Panda Plushie", 274),
    ("Lion Plushie", 281),
    ("Camel Plushie", 384),
    ("Stingray Plushie", 618),
];

fn group(name: &str, items: &[(&str, u64)]) -> CatalogGroup {
    CatalogGroup {
        name: name.to_string(),
        entries: items
            .iter()
            .map(|(item, id)| CatalogEntry::new(*item, *id))
            .collect(),
    }
}

pub fn default_catalog() -> Result<Catalog> {
    Catalog::new(vec![group("Flowers", FLOWERS), group("Plushies", PLUSHIES)])
}

/// Catalog from `path` when given, the built-in one otherwise
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let Some(path) = path else {
        return default_catalog();
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let groups = parse_catalog(&raw)
        .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
    let catalog = Catalog::new(groups)
        .with_context(|| format!("Invalid catalog {}", path.display()))?;

    info!(
        "Loaded catalog {} ({} groups, {} items)",
        path.display(),
        catalog.groups().len(),
        catalog.len()
    );
    Ok(catalog)
}

/// Parse `{"Group": {"Name": id, ...}, ...}` keeping file order
fn parse_catalog(raw: &str) -> Result<Vec<CatalogGroup>> {
    let root: Value = serde_json::from_str(raw)?;
    let groups = root
        .as_object()
        .ok_or_else(|| anyhow!("expected an object of groups"))?;

    groups
        .iter()
        .map(|(name, items)| {
            let items = items
                .as_object()
                .ok_or_else(|| anyhow!("group {} must map item names to ids", name))?;
            let entries = items
                .iter()
                .map(|(item, id)| {
                    id.as_u64()
                        .map(|id| CatalogEntry::new(item.as_str(), id))
                        .ok_or_else(|| anyhow!("item {} in {} needs a positive integer id", item, name))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(CatalogGroup {
                name: name.clone(),
                entries,
            })
        })
        .collect()
}
