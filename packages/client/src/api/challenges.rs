use std::collections::HashMap;

use common::{ChallengeStatus, GetChallengeStatusRequest};
use uuid::Uuid;

use crate::error::ClientError;
use crate::request::{RequestClient, RequestOptions};

/// Solve summary for a set of challenges.
pub async fn status(
    client: &RequestClient,
    request: &GetChallengeStatusRequest,
) -> Result<HashMap<Uuid, ChallengeStatus>, ClientError> {
    let envelope = client
        .post::<HashMap<Uuid, ChallengeStatus>>(
            "challenges/status",
            RequestOptions::new().json(request)?,
        )
        .await?;
    Ok(envelope.into_data().unwrap_or_default())
}
