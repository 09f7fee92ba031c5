pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::indexing::handlers as indexing;
use crate::ranking::handlers as ranking;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ranking API
        .route("/api/v1/rankings", post(ranking::handle_rank))
        .route("/api/v1/rankings/:job_id", get(ranking::handle_get_ranking))
        .route(
            "/api/v1/rankings/:job_id/check",
            get(ranking::handle_check_ranked),
        )
        // Resume text extraction
        .route("/api/v1/extract", post(indexing::handle_extract))
        .route(
            "/api/v1/applications/:id/extract",
            post(indexing::handle_index_application),
        )
        .with_state(state)
}
