//! User service
//!
//! CRUD over blog users with the same validation shape as articles.

use crate::db::repositories::UserRepository;
use crate::models::{CreateUserInput, NewUser, UpdateUserInput, User};
use crate::services::required_field;
use chrono::{SubsecRound, Utc};
use std::sync::Arc;

/// Message returned when an update carries none of the updatable fields
pub const EMPTY_UPDATE_MESSAGE: &str =
    "Request body content must be either 'fullname', 'username' or 'nickname'";

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("User doesn't exist")]
    NotFound(i64),

    #[error("{0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_all(&self) -> Result<Vec<User>, UserServiceError> {
        let users = self.repo.list_all().await?;
        tracing::debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<User, UserServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(UserServiceError::NotFound(id))
    }

    /// Create a user; `fullname` then `username` are required
    pub async fn create(&self, fields: NewUser) -> Result<User, UserServiceError> {
        let fullname =
            required_field(fields.fullname, "fullname").map_err(UserServiceError::ValidationError)?;
        let username =
            required_field(fields.username, "username").map_err(UserServiceError::ValidationError)?;

        self.ensure_username_available(&username, None).await?;

        let input = CreateUserInput {
            fullname,
            username,
            nickname: fields.nickname,
            date_created: Utc::now().trunc_subsecs(3),
        };

        let user = self.repo.create(&input).await?;
        tracing::info!(id = user.id, "Created user");
        Ok(user)
    }

    pub async fn update(&self, id: i64, fields: UpdateUserInput) -> Result<(), UserServiceError> {
        self.get_by_id(id).await?;

        if fields.is_empty() {
            return Err(UserServiceError::ValidationError(
                EMPTY_UPDATE_MESSAGE.to_string(),
            ));
        }

        if let Some(username) = &fields.username {
            self.ensure_username_available(username, Some(id)).await?;
        }

        if self.repo.update(id, &fields).await? == 0 {
            return Err(UserServiceError::NotFound(id));
        }

        tracing::debug!(id, "Updated user");
        Ok(())
    }

    async fn ensure_username_available(
        &self,
        username: &str,
        exclude_id: Option<i64>,
    ) -> Result<(), UserServiceError> {
        if self.repo.exists_by_username(username, exclude_id).await? {
            return Err(UserServiceError::ValidationError(format!(
                "Username '{}' is already taken",
                username
            )));
        }
        Ok(())
    }

    /// Delete a user; their articles keep existing with no author
    pub async fn remove(&self, id: i64) -> Result<(), UserServiceError> {
        if self.repo.delete(id).await? == 0 {
            return Err(UserServiceError::NotFound(id));
        }

        tracing::info!(id, "Deleted user");
        Ok(())
    }
}
