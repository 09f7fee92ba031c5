use std::sync::Arc;

use tracing::{debug, warn};

use crate::applications::ApplicationRepository;
use crate::ranking::error::RankingError;
use crate::ranking::models::{Candidate, JobId, RankingRequest};

/// Builds the scoring input for a job from already-extracted resume text.
/// Candidate order is the repository's order and is the order ranks are
/// mapped back with.
#[derive(Clone)]
pub struct ApplicationCorpusAssembler {
    applications: Arc<dyn ApplicationRepository>,
}

impl ApplicationCorpusAssembler {
    pub fn new(applications: Arc<dyn ApplicationRepository>) -> Self {
        Self { applications }
    }

    pub async fn assemble(&self, job_id: JobId) -> Result<RankingRequest, RankingError> {
        let job_text = self
            .applications
            .job_text(job_id)
            .await?
            .ok_or(RankingError::JobNotFound(job_id))?;

        let rows = self.applications.applications_for_job(job_id).await?;
        let submitted = rows.len();

        let candidates: Vec<Candidate> = rows
            .into_iter()
            .filter_map(|row| match row.clean_text {
                Some(text) if !text.trim().is_empty() => Some(Candidate {
                    application_id: row.id,
                    user_id: row.user_id,
                    resume_link: row.resume_link,
                    resume_text: text,
                }),
                _ => {
                    warn!(job_id, application_id = row.id, "Skipping application without extracted resume text");
                    None
                }
            })
            .collect();

        if candidates.is_empty() {
            return Err(RankingError::NoApplications(job_id));
        }

        debug!(job_id, submitted, candidates = candidates.len(), "Assembled candidate corpus");

        Ok(RankingRequest {
            job_id,
            job_text,
            candidates,
        })
    }
}
