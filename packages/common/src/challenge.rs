use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Submission;

/// Body of `POST /challenges/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetChallengeStatusRequest {
    pub challenge_ids: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<i64>,
}

/// Per-challenge solve summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeStatus {
    #[serde(default)]
    pub is_solved: bool,
    #[serde(default)]
    pub solved_times: i64,
    #[serde(default)]
    pub pts: i64,
    /// First-blood submissions, at most three.
    #[serde(default)]
    pub bloods: Vec<Submission>,
}
