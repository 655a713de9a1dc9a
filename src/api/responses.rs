//! Shared API response types
//!
//! Free-text fields pass through the HTML sanitizer here, on the way out.
//! Stored values are left as submitted.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Article, User};
use crate::services::sanitize_html;

/// RFC 3339 in UTC with millisecond precision, e.g. `2029-01-22T16:28:32.615Z`
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ============================================================================
// Article Response Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub title: String,
    pub style: String,
    pub content: String,
    pub date_published: String,
    pub author: Option<i64>,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: sanitize_html(&article.title),
            style: article.style,
            content: sanitize_html(&article.content),
            date_published: format_timestamp(&article.date_published),
            author: article.author,
        }
    }
}

// ============================================================================
// User Response Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub fullname: String,
    pub username: String,
    pub nickname: Option<String>,
    pub date_created: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            fullname: sanitize_html(&user.fullname),
            username: sanitize_html(&user.username),
            nickname: user.nickname.as_deref().map(sanitize_html),
            date_created: format_timestamp(&user.date_created),
        }
    }
}
