use thiserror::Error;

use crate::process::InvokeError;
use crate::ranking::models::JobId;

/// Failures from the persistence collaborators (ranking tables and the
/// job-board tables they are joined with).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ranking for job {0} already exists")]
    AlreadyRanked(JobId),

    #[error("invalid rank entries for job {job_id}: {reason}")]
    InvalidEntries { job_id: JobId, reason: String },

    #[error("stored ranking for job {job_id} is incomplete: expected {expected} entries, found {found}")]
    Incomplete {
        job_id: JobId,
        expected: usize,
        found: usize,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Everything `rank()` and friends can fail with. None of these leave a
/// partially written ranking behind.
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("job {0} not found")]
    JobNotFound(JobId),

    #[error("job {0} has no applications to rank")]
    NoApplications(JobId),

    #[error("job {0} is already ranked")]
    AlreadyRanked(JobId),

    #[error("invalid ranking request: {0}")]
    Validation(String),

    #[error("prediction failed: {0}")]
    Prediction(#[from] InvokeError),

    /// The scores were computed but could not be committed. Reported to
    /// clients the same way as a scoring failure.
    #[error("prediction failed: ranking could not be stored: {0}")]
    Persist(#[source] StoreError),

    #[error("ranking store failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for RankingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyRanked(job_id) => RankingError::AlreadyRanked(job_id),
            other => RankingError::Store(other),
        }
    }
}
