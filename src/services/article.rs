//! Article service
//!
//! Implements business logic for article management:
//! - Create, read, update, delete articles
//! - Required-field validation on create
//! - "At least one field" validation on partial update

use crate::db::repositories::ArticleRepository;
use crate::models::{Article, CreateArticleInput, NewArticle, UpdateArticleInput};
use crate::services::required_field;
use chrono::{SubsecRound, Utc};
use std::sync::Arc;

/// Message returned when an update carries none of the updatable fields
pub const EMPTY_UPDATE_MESSAGE: &str =
    "Request body content must be either 'title', 'style' or 'content'";

/// Error types for article service operations
#[derive(Debug, thiserror::Error)]
pub enum ArticleServiceError {
    /// No article with the given ID
    #[error("Article doesn't exist")]
    NotFound(i64),

    /// Request body failed validation
    #[error("{0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Article service for managing blog articles
pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
}

impl ArticleService {
    /// Create a new article service
    pub fn new(repo: Arc<dyn ArticleRepository>) -> Self {
        Self { repo }
    }

    /// List every article ordered by ID
    pub async fn list_all(&self) -> Result<Vec<Article>, ArticleServiceError> {
        let articles = self.repo.list_all().await?;
        tracing::debug!(count = articles.len(), "Listed articles");
        Ok(articles)
    }

    /// Get an article by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Article, ArticleServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(ArticleServiceError::NotFound(id))
    }

    /// Create a new article.
    ///
    /// `title`, `style` and `content` are checked in that order; the first one
    /// missing or blank is named in the validation error.
    pub async fn create(&self, fields: NewArticle) -> Result<Article, ArticleServiceError> {
        let title = required_field(fields.title, "title").map_err(ArticleServiceError::ValidationError)?;
        let style = required_field(fields.style, "style").map_err(ArticleServiceError::ValidationError)?;
        let content =
            required_field(fields.content, "content").map_err(ArticleServiceError::ValidationError)?;

        let input = CreateArticleInput {
            title,
            style,
            content,
            author: fields.author,
            date_published: Utc::now().trunc_subsecs(3),
        };

        let article = self.repo.create(&input).await?;
        tracing::info!(id = article.id, "Created article");
        Ok(article)
    }

    /// Apply a partial update.
    ///
    /// Existence is checked before the body, so an unknown ID with an empty
    /// body is reported as not found.
    pub async fn update(
        &self,
        id: i64,
        fields: UpdateArticleInput,
    ) -> Result<(), ArticleServiceError> {
        self.get_by_id(id).await?;

        if fields.is_empty() {
            return Err(ArticleServiceError::ValidationError(
                EMPTY_UPDATE_MESSAGE.to_string(),
            ));
        }

        if self.repo.update(id, &fields).await? == 0 {
            return Err(ArticleServiceError::NotFound(id));
        }

        tracing::debug!(id, "Updated article");
        Ok(())
    }

    /// Delete an article
    pub async fn remove(&self, id: i64) -> Result<(), ArticleServiceError> {
        if self.repo.delete(id).await? == 0 {
            return Err(ArticleServiceError::NotFound(id));
        }

        tracing::info!(id, "Deleted article");
        Ok(())
    }
}
