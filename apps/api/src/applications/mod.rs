//! Read access to the job-board tables this service does not own, plus the
//! single write it is allowed: storing a resume's extracted text.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::application::{ApplicationRow, JobRow};
use crate::ranking::error::StoreError;
use crate::ranking::models::{ApplicationId, JobId, JobText};

/// Storage abstraction over jobs and applications so the ranking pipeline
/// can be exercised without a database.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn job_text(&self, job_id: JobId) -> Result<Option<JobText>, StoreError>;

    /// All applications for a job, oldest first.
    async fn applications_for_job(&self, job_id: JobId) -> Result<Vec<ApplicationRow>, StoreError>;

    async fn application(&self, id: ApplicationId) -> Result<Option<ApplicationRow>, StoreError>;

    async fn store_resume_text(&self, id: ApplicationId, text: &str) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn job_text(&self, job_id: JobId) -> Result<Option<JobText>, StoreError> {
        let job: Option<JobRow> = sqlx::query_as(
            "SELECT id, title, description, responsibilities, requirements FROM jobs WHERE id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job.map(|j| JobText {
            description: j.description,
            responsibilities: j.responsibilities,
            requirements: j.requirements,
        }))
    }

    async fn applications_for_job(&self, job_id: JobId) -> Result<Vec<ApplicationRow>, StoreError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, job_id, user_id, resume_link, clean_text, created_at
            FROM applications
            WHERE job_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn application(&self, id: ApplicationId) -> Result<Option<ApplicationRow>, StoreError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "SELECT id, job_id, user_id, resume_link, clean_text, created_at FROM applications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn store_resume_text(&self, id: ApplicationId, text: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE applications SET clean_text = $1 WHERE id = $2")
            .bind(text)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
