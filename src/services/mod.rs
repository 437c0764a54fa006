//! Services for fetching, normalizing, and aggregating cost data

pub mod aggregator;
pub mod fetcher;
pub mod normalizer;

pub use aggregator::Aggregator;
