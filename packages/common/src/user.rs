use serde::{Deserialize, Serialize};

/// Permission group of a platform account, integer-coded on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Group {
    #[default]
    Guest,
    Banned,
    User,
    Admin,
}

impl From<Group> for i32 {
    fn from(group: Group) -> Self {
        match group {
            Group::Guest => 0,
            Group::Banned => 1,
            Group::User => 2,
            Group::Admin => 3,
        }
    }
}

impl TryFrom<i32> for Group {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Guest),
            1 => Ok(Self::Banned),
            2 => Ok(Self::User),
            3 => Ok(Self::Admin),
            _ => Err(format!("Invalid group '{code}'")),
        }
    }
}

impl Group {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Banned => "banned",
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated account, as held by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
    #[serde(default, alias = "name")]
    pub nickname: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub group: Group,
}

/// Body of `POST /users/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub account: String,
    pub password: String,
}
