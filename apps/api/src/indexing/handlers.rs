use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::ranking::models::ApplicationId;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    pub application_id: ApplicationId,
    pub characters: usize,
}

/// POST /api/v1/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    let text = state.indexer.extract(&request.url).await?;
    Ok(Json(ExtractResponse { text }))
}

/// POST /api/v1/applications/:id/extract
pub async fn handle_index_application(
    State(state): State<AppState>,
    Path(application_id): Path<ApplicationId>,
) -> Result<Json<IndexResponse>, AppError> {
    let characters = state.indexer.index_application(application_id).await?;
    Ok(Json(IndexResponse {
        application_id,
        characters,
    }))
}
