pub mod error;
pub mod market_api;
pub mod torn;

// Re-export commonly used types
pub use error::ApiError;
pub use market_api::MarketApi;
pub use torn::{TornClient, TornClientConfig};
