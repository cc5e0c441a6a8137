pub mod challenge;
pub mod config;
pub mod envelope;
pub mod submission;
pub mod submission_status;
pub mod user;

pub use challenge::{ChallengeStatus, GetChallengeStatusRequest};
pub use envelope::ResponseEnvelope;
pub use submission::{CreateSubmissionRequest, GetSubmissionRequest, Submission};
pub use submission_status::{ParseVerdictError, Verdict};
pub use user::{Group, LoginRequest, UserIdentity};
