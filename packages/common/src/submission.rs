use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Verdict;

/// A flag submission as returned by the backend.
///
/// Created server-side and never mutated by the client; a later fetch
/// supersedes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub status: Verdict,
    pub challenge_id: Uuid,
    pub user_id: i64,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub game_id: Option<i64>,
    /// Unix seconds.
    pub created_at: i64,

    /// Submitted flag. Empty when the backend desensitized the record.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub pts: i64,
    #[serde(default)]
    pub rank: i64,
}

/// Body of `POST /submissions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmissionRequest {
    pub content: String,
    pub challenge_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<i64>,
}

/// Query of `GET /submissions`. Unset fields are left out of the query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetSubmissionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_desensitized: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl GetSubmissionRequest {
    /// Status lookup for a single submission, without the flag content.
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            is_desensitized: Some(true),
            ..Self::default()
        }
    }

}
