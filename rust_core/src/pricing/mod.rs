pub mod listings;
pub mod resolver;

pub use listings::{extract_cost, normalize};
pub use resolver::{
    resolve_aggregate, resolve_primary, resolve_secondary, PrimaryQuote, AGGREGATE_SAMPLE_SIZE,
};
