// Market Insights pipeline.
// Extraction, classification and aggregation are pure; orchestration drives
// the cache and the listings API through their traits.

pub mod aggregator;
pub mod countries;
pub mod enrich;
pub mod extractor;
pub mod handlers;
pub mod orchestrator;
pub mod roles;
pub mod salary;
pub mod taxonomy;
pub mod text;
