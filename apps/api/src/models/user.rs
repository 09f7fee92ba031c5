use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Applicant identity as exposed alongside a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub profile_pic: Option<String>,
}
