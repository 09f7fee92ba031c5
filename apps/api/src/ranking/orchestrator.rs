//! Ranking orchestration: the only entry point handlers call.
//!
//! A job is either UNRANKED or RANKED. `rank()` moves it from one to the
//! other with no observable intermediate state; every failure leaves it
//! UNRANKED and safe to retry.

use std::sync::Arc;

use tracing::{error, info};

use crate::process::scorer::Scorer;
use crate::ranking::corpus::ApplicationCorpusAssembler;
use crate::ranking::error::{RankingError, StoreError};
use crate::ranking::locks::KeyedLocks;
use crate::ranking::models::{JobId, Ranking};
use crate::ranking::store::RankingStore;

pub struct RankingOrchestrator {
    store: Arc<dyn RankingStore>,
    assembler: ApplicationCorpusAssembler,
    scorer: Arc<dyn Scorer>,
    locks: KeyedLocks<JobId>,
}

impl RankingOrchestrator {
    pub fn new(
        store: Arc<dyn RankingStore>,
        assembler: ApplicationCorpusAssembler,
        scorer: Arc<dyn Scorer>,
    ) -> Self {
        Self {
            store,
            assembler,
            scorer,
            locks: KeyedLocks::new(),
        }
    }

    pub async fn check_ranked(&self, job_id: JobId) -> Result<bool, RankingError> {
        Ok(self.store.exists(job_id).await?)
    }

    pub async fn get_ranking(&self, job_id: JobId) -> Result<Option<Ranking>, RankingError> {
        Ok(self.store.get_ranking(job_id).await?)
    }

    /// Returns the job's ranking, scoring it first if it has none.
    pub async fn rank(&self, job_id: JobId) -> Result<Ranking, RankingError> {
        if let Some(existing) = self.existing(job_id).await? {
            info!(job_id, "Ranking already materialized, serving stored result");
            return Ok(existing);
        }

        let _guard = self.locks.lock(job_id).await;

        // Another request may have finished scoring while we waited.
        if let Some(existing) = self.existing(job_id).await? {
            info!(job_id, "Ranking materialized by a concurrent request");
            return Ok(existing);
        }

        let request = self.assembler.assemble(job_id).await?;
        request.validate()?;

        info!(job_id, candidates = request.candidates.len(), "Scoring candidates");
        let scores = self.scorer.score(&request).await.map_err(|e| {
            error!(job_id, error = %e, "Scoring failed, job stays unranked");
            RankingError::Prediction(e)
        })?;

        let entries = request.rank_entries(&scores)?;
        self.store.write_ranking(job_id, &entries).await.map_err(|e| match e {
            StoreError::AlreadyRanked(job_id) => RankingError::AlreadyRanked(job_id),
            other => {
                error!(job_id, error = %other, "Failed to persist ranking");
                RankingError::Persist(other)
            }
        })?;

        self.store
            .get_ranking(job_id)
            .await?
            .ok_or(RankingError::Store(StoreError::Incomplete {
                job_id,
                expected: entries.len(),
                found: 0,
            }))
    }

    async fn existing(&self, job_id: JobId) -> Result<Option<Ranking>, RankingError> {
        if !self.store.exists(job_id).await? {
            return Ok(None);
        }
        Ok(self.store.get_ranking(job_id).await?)
    }
}
