use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Verdict of a flag submission.
///
/// Serialized as its integer discriminant, matching the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Verdict {
    /// Waiting for the checker.
    #[default]
    Pending,
    /// The flag is correct.
    Correct,
    /// The flag is wrong.
    Incorrect,
    /// The flag belongs to another team.
    Cheat,
    /// Correct, but submitted after the game or challenge froze.
    Expired,
    /// Correct, but the challenge was already solved.
    Duplicate,
}

impl Verdict {
    /// Returns true once the checker has decided. Terminal verdicts never change.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// All possible verdicts.
    pub const ALL: &'static [Verdict] = &[
        Self::Pending,
        Self::Correct,
        Self::Incorrect,
        Self::Cheat,
        Self::Expired,
        Self::Duplicate,
    ];

    /// All terminal verdicts.
    pub const TERMINAL: &'static [Verdict] = &[
        Self::Correct,
        Self::Incorrect,
        Self::Cheat,
        Self::Expired,
        Self::Duplicate,
    ];

    /// Returns the string representation (PascalCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Correct => "Correct",
            Self::Incorrect => "Incorrect",
            Self::Cheat => "Cheat",
            Self::Expired => "Expired",
            Self::Duplicate => "Duplicate",
        }
    }

    /// Wire discriminant.
    pub fn code(&self) -> i32 {
        match self {
            Self::Pending => 0,
            Self::Correct => 1,
            Self::Incorrect => 2,
            Self::Cheat => 3,
            Self::Expired => 4,
            Self::Duplicate => 5,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Verdict> for i32 {
    fn from(verdict: Verdict) -> Self {
        verdict.code()
    }
}

impl TryFrom<i32> for Verdict {
    type Error = ParseVerdictError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.code() == code)
            .ok_or_else(|| ParseVerdictError {
                invalid: code.to_string(),
            })
    }
}

/// Error when parsing an unknown verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVerdictError {
    invalid: String,
}

impl fmt::Display for ParseVerdictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid verdict '{}'. Valid values: {}",
            self.invalid,
            Verdict::ALL
                .iter()
                .map(|v| format!("{} ({})", v.as_str(), v.code()))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseVerdictError {}

impl FromStr for Verdict {
    type Err = ParseVerdictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseVerdictError {
                invalid: s.to_string(),
            })
    }
}
