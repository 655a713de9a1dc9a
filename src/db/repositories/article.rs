//! Article repository
//!
//! Database operations for `blog_articles`.
//!
//! This module provides:
//! - `ArticleRepository` trait defining the interface for article data access
//! - `SqlxArticleRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Article, CreateArticleInput, UpdateArticleInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert an article and return the stored row
    async fn create(&self, input: &CreateArticleInput) -> Result<Article>;

    /// Get article by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// List every article, ordered by ID
    async fn list_all(&self) -> Result<Vec<Article>>;

    /// Update only the fields present in `input`; returns rows affected
    async fn update(&self, id: i64, input: &UpdateArticleInput) -> Result<u64>;

    /// Delete an article; returns rows affected
    async fn delete(&self, id: i64) -> Result<u64>;
}

/// SQLx-based article repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxArticleRepository {
    pool: DynDatabasePool,
}

impl SqlxArticleRepository {
    /// Create a new SQLx article repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ArticleRepository> {
        Arc::new(Self::new(pool))
    }

    fn sqlite(&self) -> Result<&SqlitePool> {
        self.pool.as_sqlite().context("SQLite pool unavailable")
    }

    fn mysql(&self) -> Result<&MySqlPool> {
        self.pool.as_mysql().context("MySQL pool unavailable")
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn create(&self, input: &CreateArticleInput) -> Result<Article> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_article_sqlite(self.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_article_mysql(self.mysql()?, input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_article_by_id_sqlite(self.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_article_by_id_mysql(self.mysql()?, id).await,
        }
    }

    async fn list_all(&self) -> Result<Vec<Article>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_articles_sqlite(self.sqlite()?).await,
            DatabaseDriver::Mysql => list_articles_mysql(self.mysql()?).await,
        }
    }

    async fn update(&self, id: i64, input: &UpdateArticleInput) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_article_sqlite(self.sqlite()?, id, input).await,
            DatabaseDriver::Mysql => update_article_mysql(self.mysql()?, id, input).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_article_sqlite(self.sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_article_mysql(self.mysql()?, id).await,
        }
    }
}

const INSERT_ARTICLE: &str = r#"
    INSERT INTO blog_articles (title, style, content, date_published, author)
    VALUES (?, ?, ?, ?, ?)
"#;

const SELECT_ARTICLE_BY_ID: &str = r#"
    SELECT id, title, style, content, date_published, author
    FROM blog_articles
    WHERE id = ?
"#;

const SELECT_ALL_ARTICLES: &str = r#"
    SELECT id, title, style, content, date_published, author
    FROM blog_articles
    ORDER BY id ASC
"#;

// Absent fields bind as NULL and keep the stored value
const UPDATE_ARTICLE: &str = r#"
    UPDATE blog_articles
    SET title = COALESCE(?, title), style = COALESCE(?, style), content = COALESCE(?, content)
    WHERE id = ?
"#;

const DELETE_ARTICLE: &str = "DELETE FROM blog_articles WHERE id = ?";

fn created_article(id: i64, input: &CreateArticleInput) -> Article {
    Article {
        id,
        title: input.title.clone(),
        style: input.style.clone(),
        content: input.content.clone(),
        date_published: input.date_published,
        author: input.author,
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_article_sqlite(pool: &SqlitePool, input: &CreateArticleInput) -> Result<Article> {
    let result = sqlx::query(INSERT_ARTICLE)
        .bind(&input.title)
        .bind(&input.style)
        .bind(&input.content)
        .bind(input.date_published)
        .bind(input.author)
        .execute(pool)
        .await
        .context("Failed to create article")?;

    Ok(created_article(result.last_insert_rowid(), input))
}

async fn get_article_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Article>> {
    let row = sqlx::query(SELECT_ARTICLE_BY_ID)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get article by ID")?;

    row.as_ref().map(row_to_article_sqlite).transpose()
}

async fn list_articles_sqlite(pool: &SqlitePool) -> Result<Vec<Article>> {
    let rows = sqlx::query(SELECT_ALL_ARTICLES)
        .fetch_all(pool)
        .await
        .context("Failed to list articles")?;

    rows.iter().map(row_to_article_sqlite).collect()
}

async fn update_article_sqlite(pool: &SqlitePool, id: i64, input: &UpdateArticleInput) -> Result<u64> {
    let result = sqlx::query(UPDATE_ARTICLE)
        .bind(input.title.as_deref())
        .bind(input.style.as_deref())
        .bind(input.content.as_deref())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update article")?;

    Ok(result.rows_affected())
}

async fn delete_article_sqlite(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query(DELETE_ARTICLE)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete article")?;

    Ok(result.rows_affected())
}

fn row_to_article_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Article> {
    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        style: row.try_get("style")?,
        content: row.try_get("content")?,
        date_published: row.try_get("date_published")?,
        author: row.try_get("author")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_article_mysql(pool: &MySqlPool, input: &CreateArticleInput) -> Result<Article> {
    let result = sqlx::query(INSERT_ARTICLE)
        .bind(&input.title)
        .bind(&input.style)
        .bind(&input.content)
        .bind(input.date_published)
        .bind(input.author)
        .execute(pool)
        .await
        .context("Failed to create article")?;

    Ok(created_article(result.last_insert_id() as i64, input))
}

async fn get_article_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Article>> {
    let row = sqlx::query(SELECT_ARTICLE_BY_ID)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get article by ID")?;

    row.as_ref().map(row_to_article_mysql).transpose()
}

async fn list_articles_mysql(pool: &MySqlPool) -> Result<Vec<Article>> {
    let rows = sqlx::query(SELECT_ALL_ARTICLES)
        .fetch_all(pool)
        .await
        .context("Failed to list articles")?;

    rows.iter().map(row_to_article_mysql).collect()
}

async fn update_article_mysql(pool: &MySqlPool, id: i64, input: &UpdateArticleInput) -> Result<u64> {
    let result = sqlx::query(UPDATE_ARTICLE)
        .bind(input.title.as_deref())
        .bind(input.style.as_deref())
        .bind(input.content.as_deref())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update article")?;

    Ok(result.rows_affected())
}

async fn delete_article_mysql(pool: &MySqlPool, id: i64) -> Result<u64> {
    let result = sqlx::query(DELETE_ARTICLE)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete article")?;

    Ok(result.rows_affected())
}

fn row_to_article_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Article> {
    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        style: row.try_get("style")?,
        content: row.try_get("content")?,
        date_published: row.try_get("date_published")?,
        author: row.try_get("author")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::{SubsecRound, Utc};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxArticleRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxArticleRepository::new(pool.clone());
        (pool, repo)
    }

    /// Helper to create a user for article tests
    async fn create_test_user(pool: &SqlitePool) -> i64 {
        let result = sqlx::query("INSERT INTO blog_users (fullname, username) VALUES (?, ?)")
            .bind("Test User")
            .bind("testuser")
            .execute(pool)
            .await
            .expect("Failed to create test user");
        result.last_insert_rowid()
    }

    fn create_test_input(title: &str, author: Option<i64>) -> CreateArticleInput {
        CreateArticleInput {
            title: title.to_string(),
            style: "How-to".to_string(),
            content: format!("Content for {}", title),
            author,
            date_published: Utc::now().trunc_subsecs(3),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_article() {
        let (pool, repo) = setup_test_repo().await;
        let author = create_test_user(pool.as_sqlite().unwrap()).await;

        let input = create_test_input("First post", Some(author));
        let created = repo.create(&input).await.expect("Failed to create article");
        assert!(created.id > 0);

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get article")
            .expect("Article should exist");
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_get_article_by_id_not_found() {
        let (_pool, repo) = setup_test_repo().await;
        let found = repo.get_by_id(12345).await.expect("Query should succeed");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_all_ordered_by_id() {
        let (_pool, repo) = setup_test_repo().await;
        assert!(repo.list_all().await.unwrap().is_empty());

        for i in 1..=3 {
            repo.create(&create_test_input(&format!("Article {}", i), None))
                .await
                .expect("Failed to create article");
        }

        let articles = repo.list_all().await.expect("Failed to list articles");
        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Article 1", "Article 2", "Article 3"]);
    }

    #[tokio::test]
    async fn test_update_only_supplied_fields() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo.create(&create_test_input("To Update", None)).await.unwrap();

        let affected = repo
            .update(created.id, &UpdateArticleInput::new().with_style("Interview"))
            .await
            .expect("Failed to update article");
        assert_eq!(affected, 1);

        let updated = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(updated.style, "Interview");
        assert_eq!(updated.title, "To Update");
        assert_eq!(updated.content, created.content);
        assert_eq!(updated.date_published, created.date_published);
    }

    #[tokio::test]
    async fn test_update_missing_article_affects_nothing() {
        let (_pool, repo) = setup_test_repo().await;
        let affected = repo
            .update(999, &UpdateArticleInput::new().with_title("x"))
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn test_delete_article() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo.create(&create_test_input("To Delete", None)).await.unwrap();

        assert_eq!(repo.delete(created.id).await.unwrap(), 1);
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert_eq!(repo.delete(created.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_deleting_author_clears_reference() {
        let (pool, repo) = setup_test_repo().await;
        let sqlite_pool = pool.as_sqlite().unwrap();
        let author = create_test_user(sqlite_pool).await;
        let created = repo.create(&create_test_input("Orphan", Some(author))).await.unwrap();

        sqlx::query("DELETE FROM blog_users WHERE id = ?")
            .bind(author)
            .execute(sqlite_pool)
            .await
            .expect("Failed to delete user");

        let article = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(article.author, None);
    }
}
