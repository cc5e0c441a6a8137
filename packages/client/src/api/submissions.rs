use common::{CreateSubmissionRequest, GetSubmissionRequest, ResponseEnvelope, Submission};

use crate::error::ClientError;
use crate::request::{RequestClient, RequestOptions};

const PATH: &str = "submissions";

/// Submit a flag. The returned submission is usually still `Pending`.
pub async fn create(
    client: &RequestClient,
    request: &CreateSubmissionRequest,
) -> Result<Submission, ClientError> {
    client
        .post::<Submission>(PATH, RequestOptions::new().json(request)?)
        .await?
        .into_data()
        .ok_or_else(|| ClientError::EmptyPayload { path: PATH.into() })
}

pub async fn get(
    client: &RequestClient,
    request: &GetSubmissionRequest,
) -> Result<ResponseEnvelope<Vec<Submission>>, ClientError> {
    client
        .get(PATH, RequestOptions::new().query(request)?)
        .await
}
