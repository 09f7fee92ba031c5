use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::models::ranking::RankedCandidate;
use crate::ranking::error::StoreError;
use crate::ranking::models::{check_entries, JobId, RankEntry, Ranking};

/// Persistence for materialized rankings.
///
/// `exists` and `get_ranking` only ever observe complete rankings:
/// `write_ranking` makes the whole entry set visible at once or not at all,
/// and rejects a second write for the same job with `AlreadyRanked`.
#[async_trait]
pub trait RankingStore: Send + Sync {
    async fn exists(&self, job_id: JobId) -> Result<bool, StoreError>;

    async fn write_ranking(&self, job_id: JobId, entries: &[RankEntry]) -> Result<(), StoreError>;

    /// `Ok(None)` when the job has not been ranked yet.
    async fn get_ranking(&self, job_id: JobId) -> Result<Option<Ranking>, StoreError>;
}

/// PostgreSQL store. The `rankings` row is the completion marker: it is
/// inserted in the same transaction as the entries, and its primary key is
/// what makes a duplicate write fail.
#[derive(Clone)]
pub struct PgRankingStore {
    pool: PgPool,
}

impl PgRankingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RankingStore for PgRankingStore {
    async fn exists(&self, job_id: JobId) -> Result<bool, StoreError> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM rankings WHERE job_id = $1)")
                .bind(job_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn write_ranking(&self, job_id: JobId, entries: &[RankEntry]) -> Result<(), StoreError> {
        check_entries(job_id, entries)
            .map_err(|reason| StoreError::InvalidEntries { job_id, reason })?;

        let mut tx = self.pool.begin().await?;

        // A concurrent writer blocks here until the first commits, then sees
        // the conflict and inserts nothing.
        let claimed = sqlx::query(
            "INSERT INTO rankings (job_id, candidate_count) VALUES ($1, $2) ON CONFLICT (job_id) DO NOTHING",
        )
        .bind(job_id)
        .bind(entries.len() as i32)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if claimed == 0 {
            tx.rollback().await?;
            return Err(StoreError::AlreadyRanked(job_id));
        }

        let application_ids: Vec<i64> = entries.iter().map(|e| e.application_id).collect();
        let user_ids: Vec<i64> = entries.iter().map(|e| e.user_id).collect();
        let ranks: Vec<i32> = entries.iter().map(|e| e.rank).collect();
        let scores: Vec<f64> = entries.iter().map(|e| e.score).collect();
        let links: Vec<String> = entries.iter().map(|e| e.resume_link.clone()).collect();

        sqlx::query(
            r#"
            INSERT INTO rank_entries (job_id, application_id, user_id, rank, score, resume_link)
            SELECT $1::BIGINT, * FROM UNNEST($2::BIGINT[], $3::BIGINT[], $4::INT[], $5::FLOAT8[], $6::TEXT[])
            "#,
        )
        .bind(job_id)
        .bind(application_ids)
        .bind(user_ids)
        .bind(ranks)
        .bind(scores)
        .bind(links)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(job_id, entries = entries.len(), "Ranking committed");
        Ok(())
    }

    async fn get_ranking(&self, job_id: JobId) -> Result<Option<Ranking>, StoreError> {
        let expected: Option<i32> =
            sqlx::query_scalar("SELECT candidate_count FROM rankings WHERE job_id = $1")
                .bind(job_id)
                .fetch_optional(&self.pool)
                .await?;
        let Some(expected) = expected else {
            return Ok(None);
        };

        let ranking = sqlx::query_as::<_, RankedCandidate>(
            r#"
            SELECT e.rank, e.score, e.resume_link,
                   u.id, u.username, u.email, u.profile_pic
            FROM rank_entries e
            JOIN users u ON u.id = e.user_id
            WHERE e.job_id = $1
            ORDER BY e.rank ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        if ranking.len() != expected as usize {
            return Err(StoreError::Incomplete {
                job_id,
                expected: expected as usize,
                found: ranking.len(),
            });
        }

        Ok(Some(Ranking { job_id, ranking }))
    }
}
