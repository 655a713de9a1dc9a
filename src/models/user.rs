//! User model
//!
//! Users are plain pass-through records: no passwords or roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub fullname: String,
    /// Unique login name
    pub username: String,
    pub nickname: Option<String>,
    pub date_created: DateTime<Utc>,
}

/// Create request body as received from the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub fullname: Option<String>,
    pub username: Option<String>,
    pub nickname: Option<String>,
}

impl NewUser {
    pub fn new(fullname: &str, username: &str) -> Self {
        Self {
            fullname: Some(fullname.to_string()),
            username: Some(username.to_string()),
            nickname: None,
        }
    }

    pub fn with_nickname(mut self, nickname: &str) -> Self {
        self.nickname = Some(nickname.to_string());
        self
    }
}

/// Validated input for inserting a user
#[derive(Debug, Clone, PartialEq)]
pub struct CreateUserInput {
    pub fullname: String,
    pub username: String,
    pub nickname: Option<String>,
    pub date_created: DateTime<Utc>,
}

/// Partial update of a user; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl UpdateUserInput {
    pub fn is_empty(&self) -> bool {
        self.fullname.is_none() && self.username.is_none() && self.nickname.is_none()
    }

    pub fn apply_to(&self, user: &User) -> User {
        User {
            fullname: self.fullname.clone().unwrap_or_else(|| user.fullname.clone()),
            username: self.username.clone().unwrap_or_else(|| user.username.clone()),
            nickname: self.nickname.clone().or_else(|| user.nickname.clone()),
            ..user.clone()
        }
    }
}
