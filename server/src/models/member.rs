use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub member_id: String,
    pub name: String,
    /// Absent when the identity provider withheld consent.
    pub email: Option<String>,
}

/// Body of `PUT /api/members/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberUpdate {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}
