//! Resume scoring behind the `Scorer` trait, implemented by the scoring
//! engine process and by test doubles.
//!
//! Wire contract of the scoring engine:
//! - argument: `{"job_post_texts":[desc,resp,req],"resumes_texts":[t1,..,tN]}`
//! - stdout:   `{"scores":[s1,..,sN],"ranks":[r1,..,rN]}` (ranks optional),
//!   positionally aligned with `resumes_texts`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ProcessConfig;
use crate::process::{invoke, InvokeError};
use crate::ranking::models::RankingRequest;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Argument passed to the scoring engine. Field order inside
/// `job_post_texts` is fixed: description, responsibilities, requirements.
#[derive(Debug, Serialize)]
pub struct ScoringPayload<'a> {
    pub job_post_texts: [&'a str; 3],
    pub resumes_texts: Vec<&'a str>,
}

impl<'a> From<&'a RankingRequest> for ScoringPayload<'a> {
    fn from(request: &'a RankingRequest) -> Self {
        Self {
            job_post_texts: request.job_text.ordered(),
            resumes_texts: request
                .candidates
                .iter()
                .map(|c| c.resume_text.as_str())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScoringOutput {
    scores: Vec<f64>,
    #[serde(default)]
    ranks: Option<Vec<i32>>,
}

/// Score for the candidate at the same position in the request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub rank: i32,
    pub score: f64,
}

#[async_trait]
pub trait Scorer: Send + Sync {
    /// Returns one `CandidateScore` per candidate, in request order.
    async fn score(&self, request: &RankingRequest) -> Result<Vec<CandidateScore>, InvokeError>;
}

/// Runs the external scoring engine once per call. No retries.
#[derive(Debug, Clone)]
pub struct ScoringProcessInvoker {
    config: ProcessConfig,
}

impl ScoringProcessInvoker {
    pub fn new(config: ProcessConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Scorer for ScoringProcessInvoker {
    async fn score(&self, request: &RankingRequest) -> Result<Vec<CandidateScore>, InvokeError> {
        let payload = serde_json::to_string(&ScoringPayload::from(request))?;

        let invocation = invoke(&self.config, payload).await?;
        let scores = parse_scoring_output(&invocation.stdout, request.candidates.len())?;

        info!(
            invocation_id = %invocation.id,
            job_id = request.job_id,
            candidates = scores.len(),
            "Scoring engine returned a ranking"
        );
        Ok(scores)
    }
}

/// Parses and checks the engine's stdout against the number of candidates sent.
pub fn parse_scoring_output(stdout: &[u8], expected: usize) -> Result<Vec<CandidateScore>, InvokeError> {
    let output: ScoringOutput = serde_json::from_slice(stdout)
        .map_err(|e| InvokeError::OutputFormat(format!("scoring output is not valid JSON: {e}")))?;

    if output.scores.len() != expected {
        return Err(InvokeError::OutputFormat(format!(
            "expected {expected} scores, got {}",
            output.scores.len()
        )));
    }
    if let Some(bad) = output
        .scores
        .iter()
        .find(|s| !s.is_finite() || **s < MIN_SCORE || **s > MAX_SCORE)
    {
        return Err(InvokeError::OutputFormat(format!(
            "score {bad} outside [{MIN_SCORE}, {MAX_SCORE}]"
        )));
    }

    let ranks = match output.ranks {
        Some(ranks) => {
            if ranks.len() != expected {
                return Err(InvokeError::OutputFormat(format!(
                    "expected {expected} ranks, got {}",
                    ranks.len()
                )));
            }
            check_rank_permutation(&ranks).map_err(InvokeError::OutputFormat)?;
            ranks
        }
        None => ranks_from_scores(&output.scores),
    };

    Ok(ranks
        .into_iter()
        .zip(output.scores)
        .map(|(rank, score)| CandidateScore { rank, score })
        .collect())
}

/// Highest score gets rank 1. Ties keep input order.
pub fn ranks_from_scores(scores: &[f64]) -> Vec<i32> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut ranks = vec![0; scores.len()];
    for (position, index) in order.into_iter().enumerate() {
        ranks[index] = position as i32 + 1;
    }
    ranks
}

/// `ranks` must be exactly `{1, ..., N}`.
pub fn check_rank_permutation(ranks: &[i32]) -> Result<(), String> {
    let n = ranks.len();
    let mut seen = vec![false; n];
    for &rank in ranks {
        if rank < 1 || rank as usize > n {
            return Err(format!("rank {rank} outside 1..={n}"));
        }
        let slot = &mut seen[rank as usize - 1];
        if *slot {
            return Err(format!("rank {rank} appears more than once"));
        }
        *slot = true;
    }
    Ok(())
}
