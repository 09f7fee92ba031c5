use std::sync::Arc;

use crate::indexing::ResumeIndexer;
use crate::ranking::orchestrator::RankingOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub rankings: Arc<RankingOrchestrator>,
    pub indexer: Arc<ResumeIndexer>,
}
