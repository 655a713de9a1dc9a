//! API middleware
//!
//! Contains the shared application state and the error type every handler
//! returns.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::repositories::{SqlxArticleRepository, SqlxUserRepository};
use crate::db::DynDatabasePool;
use crate::services::{ArticleService, ArticleServiceError, UserService, UserServiceError};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    /// Shared with the repositories; closed on shutdown
    pub pool: DynDatabasePool,
    pub article_service: Arc<ArticleService>,
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Wire repositories and services on top of a database pool
    pub fn from_pool(pool: DynDatabasePool) -> Self {
        let article_repo = SqlxArticleRepository::boxed(pool.clone());
        let user_repo = SqlxUserRepository::boxed(pool.clone());

        Self {
            article_service: Arc::new(ArticleService::new(article_repo)),
            user_service: Arc::new(UserService::new(user_repo)),
            pool,
        }
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    /// Selects the status code; not part of the body
    #[serde(skip)]
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Log `detail` and hide it from the client
    pub fn internal_error(detail: impl std::fmt::Display) -> Self {
        tracing::error!("Internal error: {}", detail);
        Self::new("INTERNAL_ERROR", "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ArticleServiceError> for ApiError {
    fn from(e: ArticleServiceError) -> Self {
        match e {
            ArticleServiceError::NotFound(_) => ApiError::not_found(e.to_string()),
            ArticleServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            ArticleServiceError::InternalError(err) => ApiError::internal_error(format!("{:#}", err)),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::NotFound(_) => ApiError::not_found(e.to_string()),
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::InternalError(err) => ApiError::internal_error(format!("{:#}", err)),
        }
    }
}
