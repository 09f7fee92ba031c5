use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::user::User;

/// One row of the ranked view: a rank entry joined with its applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    #[sqlx(flatten)]
    pub user: User,
    pub rank: i32,
    pub score: f64,
    pub resume_link: String,
}
