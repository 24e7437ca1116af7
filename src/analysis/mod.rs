//! Analysis modules.
//!
//! Aggregation of collector blobs into subject records, the weak signal
//! extractors it relies on, and confidence scoring.

pub mod aggregator;
pub mod extract;
pub mod scoring;

pub use aggregator::Aggregator;
