use std::sync::Arc;

use crate::config::Config;
use crate::market::orchestrator::MarketInsightsService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Cache, listings client and enrichment behind the insights endpoints.
    pub insights: Arc<MarketInsightsService>,
}
