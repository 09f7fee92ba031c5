use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::ranking::RankedCandidate;
use crate::process::scorer::{check_rank_permutation, CandidateScore};
use crate::process::InvokeError;
use crate::ranking::error::RankingError;

pub type JobId = i64;
pub type ApplicationId = i64;
pub type UserId = i64;

/// The three descriptive fields of a job posting, in the order the scoring
/// engine expects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobText {
    pub description: String,
    pub responsibilities: String,
    pub requirements: String,
}

impl JobText {
    pub fn ordered(&self) -> [&str; 3] {
        [
            self.description.as_str(),
            self.responsibilities.as_str(),
            self.requirements.as_str(),
        ]
    }

    pub fn is_blank(&self) -> bool {
        self.ordered().iter().all(|field| field.trim().is_empty())
    }
}

/// One applicant in the candidate corpus. The scoring engine never sees the
/// identifiers; they ride along so positional results can be mapped back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub application_id: ApplicationId,
    pub user_id: UserId,
    pub resume_link: String,
    pub resume_text: String,
}

/// Input for a single scoring run. Built fresh per `rank()`; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRequest {
    pub job_id: JobId,
    pub job_text: JobText,
    pub candidates: Vec<Candidate>,
}

impl RankingRequest {
    /// Rejects requests that would send garbage to the scoring engine.
    pub fn validate(&self) -> Result<(), RankingError> {
        if self.candidates.is_empty() {
            return Err(RankingError::NoApplications(self.job_id));
        }
        if self.job_text.is_blank() {
            return Err(RankingError::Validation(format!(
                "job {} has no description, responsibilities or requirements",
                self.job_id
            )));
        }

        let mut seen = HashSet::with_capacity(self.candidates.len());
        for candidate in &self.candidates {
            if !seen.insert(candidate.application_id) {
                return Err(RankingError::Validation(format!(
                    "application {} appears more than once",
                    candidate.application_id
                )));
            }
            if candidate.resume_text.trim().is_empty() {
                return Err(RankingError::Validation(format!(
                    "application {} has no resume text",
                    candidate.application_id
                )));
            }
        }
        Ok(())
    }

    /// Zips positional scores back onto candidate identities.
    pub fn rank_entries(&self, scores: &[CandidateScore]) -> Result<Vec<RankEntry>, RankingError> {
        if scores.len() != self.candidates.len() {
            return Err(RankingError::Prediction(InvokeError::OutputFormat(format!(
                "expected {} scores, got {}",
                self.candidates.len(),
                scores.len()
            ))));
        }
        let ranks: Vec<i32> = scores.iter().map(|s| s.rank).collect();
        check_rank_permutation(&ranks)
            .map_err(|reason| RankingError::Prediction(InvokeError::OutputFormat(reason)))?;

        Ok(self
            .candidates
            .iter()
            .zip(scores)
            .map(|(candidate, scored)| RankEntry {
                job_id: self.job_id,
                application_id: candidate.application_id,
                user_id: candidate.user_id,
                rank: scored.rank,
                score: scored.score,
                resume_link: candidate.resume_link.clone(),
            })
            .collect())
    }
}

/// Immutable once written. All entries for a job form its ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub job_id: JobId,
    pub application_id: ApplicationId,
    pub user_id: UserId,
    /// 1 = best match.
    pub rank: i32,
    pub score: f64,
    pub resume_link: String,
}

/// The materialized ranking for a job, ordered by rank ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    pub job_id: JobId,
    pub ranking: Vec<RankedCandidate>,
}

/// Store-side guard: a write must be non-empty, belong to one job, and carry
/// ranks forming exactly `1..=N`.
pub fn check_entries(job_id: JobId, entries: &[RankEntry]) -> Result<(), String> {
    if entries.is_empty() {
        return Err("a ranking needs at least one entry".to_string());
    }
    if let Some(stray) = entries.iter().find(|e| e.job_id != job_id) {
        return Err(format!("entry belongs to job {}", stray.job_id));
    }
    let ranks: Vec<i32> = entries.iter().map(|e| e.rank).collect();
    check_rank_permutation(&ranks)
}
