use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub responsibilities: String,
    pub requirements: String,
}

/// A submitted application. `clean_text` is filled in by the text extractor
/// after the resume is uploaded and stays `None` until then.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: i64,
    pub job_id: i64,
    pub user_id: i64,
    pub resume_link: String,
    pub clean_text: Option<String>,
    pub created_at: DateTime<Utc>,
}
