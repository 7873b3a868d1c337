//! price_sampler_rust - samples catalog prices into a rolling history file

pub mod catalog;
pub mod config;
pub mod sampler;

pub use config::SamplerConfig;
pub use sampler::PriceSampler;
