//! Shared fixtures for the HTTP integration tests
//!
//! Every test gets its own in-memory SQLite database behind a full router.

#![allow(dead_code)]

use axum_test::TestServer;
use blog_server::api::{build_router, AppState};
use blog_server::db::{create_test_pool, migrations, DynDatabasePool};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipisicing elit. Natus consequuntur deserunt commodi, nobis qui inventore corrupti iusto aliquid debitis unde non.Adipisci, pariatur.Molestiae, libero esse hic adipisci autem neque ?";

pub const XSS_TITLE: &str = r#"Naughty naughty very naughty <script>alert("xss");</script>"#;
pub const XSS_CONTENT: &str = r#"Bad image <img src="https://url.to.file.which/does-not.exist" onerror="alert(document.cookie);">. But not <strong>all</strong> bad."#;

pub struct FixtureArticle {
    pub id: i64,
    pub title: &'static str,
    pub style: &'static str,
    pub content: &'static str,
    pub date_published: &'static str,
    pub author: Option<i64>,
}

impl FixtureArticle {
    /// The JSON the API is expected to return for this article
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "style": self.style,
            "content": self.content,
            "date_published": self.date_published,
            "author": self.author,
        })
    }
}

pub fn make_articles() -> Vec<FixtureArticle> {
    vec![
        FixtureArticle {
            id: 1,
            title: "First test post!",
            style: "How-to",
            content: LOREM,
            date_published: "2029-01-22T16:28:32.615Z",
            author: Some(1),
        },
        FixtureArticle {
            id: 2,
            title: "Second test post!",
            style: "News",
            content: LOREM,
            date_published: "2100-05-22T16:28:32.615Z",
            author: Some(1),
        },
        FixtureArticle {
            id: 3,
            title: "Third test post!",
            style: "Listicle",
            content: LOREM,
            date_published: "1919-12-22T16:28:32.615Z",
            author: Some(2),
        },
        FixtureArticle {
            id: 4,
            title: "Fourth test post!",
            style: "Story",
            content: LOREM,
            date_published: "1919-12-22T16:28:32.615Z",
            author: Some(2),
        },
    ]
}

pub fn malicious_article() -> FixtureArticle {
    FixtureArticle {
        id: 911,
        title: XSS_TITLE,
        style: "How-to",
        content: XSS_CONTENT,
        date_published: "2029-01-22T16:28:32.615Z",
        author: None,
    }
}

/// Users referenced by the article fixtures' `author` column
pub fn make_users() -> Vec<(i64, &'static str, &'static str, Option<&'static str>)> {
    vec![
        (1, "Dunder Mifflin", "dunder", None),
        (2, "Bodeep Deboop", "b.deboop", Some("Bodeep")),
    ]
}

pub fn parse_date(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("Invalid fixture date")
        .with_timezone(&Utc)
}

/// Start a server over a fresh, migrated database
pub async fn setup() -> (TestServer, DynDatabasePool) {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let app = build_router(AppState::from_pool(pool.clone()), "*");
    let server = TestServer::new(app).expect("Failed to start test server");
    (server, pool)
}

pub async fn insert_users(pool: &DynDatabasePool) {
    let sqlite = pool.as_sqlite().expect("SQLite pool");
    for (id, fullname, username, nickname) in make_users() {
        sqlx::query(
            "INSERT INTO blog_users (id, fullname, username, nickname, date_created) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(fullname)
        .bind(username)
        .bind(nickname)
        .bind(parse_date("2029-01-22T16:28:32.615Z"))
        .execute(sqlite)
        .await
        .expect("Failed to insert fixture user");
    }
}

pub async fn insert_articles(pool: &DynDatabasePool, articles: &[FixtureArticle]) {
    let sqlite = pool.as_sqlite().expect("SQLite pool");
    for article in articles {
        sqlx::query(
            "INSERT INTO blog_articles (id, title, style, content, date_published, author) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(article.id)
        .bind(article.title)
        .bind(article.style)
        .bind(article.content)
        .bind(parse_date(article.date_published))
        .bind(article.author)
        .execute(sqlite)
        .await
        .expect("Failed to insert fixture article");
    }
}

/// Users and the four standard articles
pub async fn seed(pool: &DynDatabasePool) -> Vec<FixtureArticle> {
    insert_users(pool).await;
    let articles = make_articles();
    insert_articles(pool, &articles).await;
    articles
}
