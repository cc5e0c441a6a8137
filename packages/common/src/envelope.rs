use serde::{Deserialize, Serialize};

/// Uniform wrapper around every API response body.
///
/// The HTTP status is the authoritative success signal; `code` mirrors it by
/// backend convention but is never used for classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    pub code: i64,
    #[serde(default, alias = "msg", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Total row count for paginated list endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Server timestamp (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
}

impl<T> ResponseEnvelope<T> {
    /// Successful envelope carrying a payload.
    pub fn ok(data: T) -> Self {
        Self {
            code: 200,
            message: None,
            data: Some(data),
            total: None,
            ts: None,
        }
    }

    /// Payload-less envelope, used for errors and empty replies.
    pub fn bare(code: i64, message: Option<String>) -> Self {
        Self {
            code,
            message,
            data: None,
            total: None,
            ts: None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}
