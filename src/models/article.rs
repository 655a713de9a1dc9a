//! Article model
//!
//! This module provides:
//! - `Article` entity representing a row of `blog_articles`
//! - `NewArticle`, the unvalidated create request body
//! - `CreateArticleInput` and `UpdateArticleInput` handed to the repository

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conventional values of [`Article::style`]. Not enforced.
pub const ARTICLE_STYLES: &[&str] = &["How-to", "News", "Listicle", "Interview", "Story"];

/// Article entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier
    pub id: i64,
    /// Article title
    pub title: String,
    /// Article style, e.g. "How-to" or "Listicle"
    pub style: String,
    /// Article body
    pub content: String,
    /// Creation timestamp, set by the server
    pub date_published: DateTime<Utc>,
    /// Author user ID
    pub author: Option<i64>,
}

/// Create request body as received from the client.
///
/// Every field is optional here so that a missing field can be reported by
/// name instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewArticle {
    pub title: Option<String>,
    pub style: Option<String>,
    pub content: Option<String>,
    pub author: Option<i64>,
}

impl NewArticle {
    pub fn new(title: &str, style: &str, content: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            style: Some(style.to_string()),
            content: Some(content.to_string()),
            author: None,
        }
    }

    /// Set the author
    pub fn with_author(mut self, author: i64) -> Self {
        self.author = Some(author);
        self
    }
}

/// Validated input for inserting an article
#[derive(Debug, Clone, PartialEq)]
pub struct CreateArticleInput {
    pub title: String,
    pub style: String,
    pub content: String,
    pub author: Option<i64>,
    pub date_published: DateTime<Utc>,
}

/// Partial update of an article.
///
/// `None` means "leave unchanged". Unknown fields in the request body are
/// ignored during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateArticleInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl UpdateArticleInput {
    /// Create an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the style
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Set the content
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// True when no updatable field is present
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.style.is_none() && self.content.is_none()
    }

    /// Apply this update on top of an existing article
    pub fn apply_to(&self, article: &Article) -> Article {
        Article {
            title: self.title.clone().unwrap_or_else(|| article.title.clone()),
            style: self.style.clone().unwrap_or_else(|| article.style.clone()),
            content: self.content.clone().unwrap_or_else(|| article.content.clone()),
            ..article.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_article() -> Article {
        Article {
            id: 2,
            title: "Second test post!".to_string(),
            style: "News".to_string(),
            content: "Lorem ipsum".to_string(),
            date_published: Utc::now(),
            author: Some(1),
        }
    }

    #[test]
    fn test_update_input_ignores_unknown_fields() {
        let input: UpdateArticleInput =
            serde_json::from_str(r#"{"irrelevantField": "foo"}"#).unwrap();
        assert!(input.is_empty());
    }

    #[test]
    fn test_update_input_distinguishes_empty_string_from_absent() {
        let input: UpdateArticleInput = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert!(!input.is_empty());
        assert_eq!(input.title.as_deref(), Some(""));
        assert!(input.style.is_none());
    }

    #[test]
    fn test_apply_to_only_changes_supplied_fields() {
        let article = sample_article();
        let updated = UpdateArticleInput::new()
            .with_title("updated article title")
            .apply_to(&article);

        assert_eq!(updated.title, "updated article title");
        assert_eq!(updated.style, article.style);
        assert_eq!(updated.content, article.content);
        assert_eq!(updated.date_published, article.date_published);
        assert_eq!(updated.author, article.author);
    }

    #[test]
    fn test_new_article_from_partial_json() {
        let body: NewArticle = serde_json::from_str(r#"{"title": "t", "style": "News"}"#).unwrap();
        assert_eq!(body.title.as_deref(), Some("t"));
        assert!(body.content.is_none());
        assert!(body.author.is_none());
    }
}
