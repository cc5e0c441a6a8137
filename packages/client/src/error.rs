use std::time::Duration;

use common::ResponseEnvelope;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failure class of a request. Every non-success outcome maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// HTTP 401. The session has been cleared.
    Auth,
    /// HTTP 502, or the backend could not be reached at all.
    Gateway,
    /// The client-side deadline elapsed.
    Timeout,
    /// Any other non-2xx, or a response the client could not use.
    Request,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "AuthError",
            Self::Gateway => "GatewayError",
            Self::Timeout => "TimeoutError",
            Self::Request => "RequestError",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an HTTP status. `None` means success.
///
/// Checked in pipeline order: 401, 502, any other non-2xx.
pub fn classify_status(status: StatusCode) -> Option<FailureKind> {
    if status == StatusCode::UNAUTHORIZED {
        Some(FailureKind::Auth)
    } else if status == StatusCode::BAD_GATEWAY {
        Some(FailureKind::Gateway)
    } else if !status.is_success() {
        Some(FailureKind::Request)
    } else {
        None
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    #[error("Unauthorized: {}", .0.message.as_deref().unwrap_or("sign in required"))]
    Unauthorized(ResponseEnvelope<Value>),

    #[error("Server offline: {0}")]
    Gateway(String),

    #[error("Request failed with HTTP {status}: {}", .envelope.message.as_deref().unwrap_or("no message"))]
    Request {
        status: StatusCode,
        envelope: ResponseEnvelope<Value>,
    },

    #[error("Malformed response (HTTP {status}): {source}")]
    Decode {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response from {path} carried no data")]
    EmptyPayload { path: String },

    #[error("Serialization error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Unauthorized(_) => FailureKind::Auth,
            Self::Gateway(_) => FailureKind::Gateway,
            Self::Request { .. }
            | Self::Decode { .. }
            | Self::EmptyPayload { .. }
            | Self::Encode(_)
            | Self::Transport(_) => FailureKind::Request,
        }
    }

    /// The parsed error envelope, for 401 and other non-2xx replies.
    pub fn envelope(&self) -> Option<&ResponseEnvelope<Value>> {
        match self {
            Self::Unauthorized(envelope) | Self::Request { envelope, .. } => Some(envelope),
            _ => None,
        }
    }

    /// HTTP status of the reply, when there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            Self::Request { status, .. } | Self::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }
}
