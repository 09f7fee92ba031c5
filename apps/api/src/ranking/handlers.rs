//! Axum route handlers for the Ranking API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::ranking::models::{JobId, Ranking};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankRequest {
    pub job_id: JobId,
}

/// POST /api/v1/rankings
///
/// Ranks the job's applicants, or returns the stored ranking if one exists.
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Result<Json<Ranking>, AppError> {
    let job_id = validate_job_id(request.job_id)?;
    Ok(Json(state.rankings.rank(job_id).await?))
}

/// GET /api/v1/rankings/:job_id
pub async fn handle_get_ranking(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> Result<Json<Ranking>, AppError> {
    let job_id = validate_job_id(job_id)?;
    state
        .rankings
        .get_ranking(job_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} has not been ranked")))
}

/// GET /api/v1/rankings/:job_id/check
pub async fn handle_check_ranked(
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> Result<Json<bool>, AppError> {
    let job_id = validate_job_id(job_id)?;
    Ok(Json(state.rankings.check_ranked(job_id).await?))
}

fn validate_job_id(job_id: JobId) -> Result<JobId, AppError> {
    if job_id <= 0 {
        return Err(AppError::Validation(format!(
            "jobId must be a positive integer, got {job_id}"
        )));
    }
    Ok(job_id)
}
