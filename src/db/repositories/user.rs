//! User repository
//!
//! Database operations for `blog_users`.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{CreateUserInput, UpdateUserInput, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return the stored row
    async fn create(&self, input: &CreateUserInput) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// List every user, ordered by ID
    async fn list_all(&self) -> Result<Vec<User>>;

    /// Update only the fields present in `input`; returns rows affected
    async fn update(&self, id: i64, input: &UpdateUserInput) -> Result<u64>;

    /// Delete a user; returns rows affected
    async fn delete(&self, id: i64) -> Result<u64>;

    /// True if another user (other than `exclude_id`) holds `username`
    async fn exists_by_username(&self, username: &str, exclude_id: Option<i64>) -> Result<bool>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
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
impl UserRepository for SqlxUserRepository {
    async fn create(&self, input: &CreateUserInput) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_user_sqlite(self.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_user_mysql(self.mysql()?, input).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_user_by_id_sqlite(self.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_user_by_id_mysql(self.mysql()?, id).await,
        }
    }

    async fn list_all(&self) -> Result<Vec<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_users_sqlite(self.sqlite()?).await,
            DatabaseDriver::Mysql => list_users_mysql(self.mysql()?).await,
        }
    }

    async fn update(&self, id: i64, input: &UpdateUserInput) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_user_sqlite(self.sqlite()?, id, input).await,
            DatabaseDriver::Mysql => update_user_mysql(self.mysql()?, id, input).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_user_sqlite(self.sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_user_mysql(self.mysql()?, id).await,
        }
    }

    async fn exists_by_username(&self, username: &str, exclude_id: Option<i64>) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_by_username_sqlite(self.sqlite()?, username, exclude_id).await
            }
            DatabaseDriver::Mysql => {
                exists_by_username_mysql(self.mysql()?, username, exclude_id).await
            }
        }
    }
}

const INSERT_USER: &str = r#"
    INSERT INTO blog_users (fullname, username, nickname, date_created)
    VALUES (?, ?, ?, ?)
"#;

const SELECT_USER_BY_ID: &str = r#"
    SELECT id, fullname, username, nickname, date_created
    FROM blog_users
    WHERE id = ?
"#;

const SELECT_ALL_USERS: &str = r#"
    SELECT id, fullname, username, nickname, date_created
    FROM blog_users
    ORDER BY id ASC
"#;

const UPDATE_USER: &str = r#"
    UPDATE blog_users
    SET fullname = COALESCE(?, fullname), username = COALESCE(?, username), nickname = COALESCE(?, nickname)
    WHERE id = ?
"#;

const DELETE_USER: &str = "DELETE FROM blog_users WHERE id = ?";

const COUNT_USERNAME: &str = r#"
    SELECT COUNT(*) AS count
    FROM blog_users
    WHERE username = ? AND (? IS NULL OR id != ?)
"#;

fn created_user(id: i64, input: &CreateUserInput) -> User {
    User {
        id,
        fullname: input.fullname.clone(),
        username: input.username.clone(),
        nickname: input.nickname.clone(),
        date_created: input.date_created,
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(pool: &SqlitePool, input: &CreateUserInput) -> Result<User> {
    let result = sqlx::query(INSERT_USER)
        .bind(&input.fullname)
        .bind(&input.username)
        .bind(input.nickname.as_deref())
        .bind(input.date_created)
        .execute(pool)
        .await
        .context("Failed to create user")?;

    Ok(created_user(result.last_insert_rowid(), input))
}

async fn get_user_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query(SELECT_USER_BY_ID)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    row.as_ref().map(row_to_user_sqlite).transpose()
}

async fn list_users_sqlite(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows = sqlx::query(SELECT_ALL_USERS)
        .fetch_all(pool)
        .await
        .context("Failed to list users")?;

    rows.iter().map(row_to_user_sqlite).collect()
}

async fn update_user_sqlite(pool: &SqlitePool, id: i64, input: &UpdateUserInput) -> Result<u64> {
    let result = sqlx::query(UPDATE_USER)
        .bind(input.fullname.as_deref())
        .bind(input.username.as_deref())
        .bind(input.nickname.as_deref())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update user")?;

    Ok(result.rows_affected())
}

async fn delete_user_sqlite(pool: &SqlitePool, id: i64) -> Result<u64> {
    let result = sqlx::query(DELETE_USER)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;

    Ok(result.rows_affected())
}

async fn exists_by_username_sqlite(
    pool: &SqlitePool,
    username: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let row = sqlx::query(COUNT_USERNAME)
        .bind(username)
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
        .context("Failed to check username existence")?;

    let count: i64 = row.try_get("count")?;
    Ok(count > 0)
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        fullname: row.try_get("fullname")?,
        username: row.try_get("username")?,
        nickname: row.try_get("nickname")?,
        date_created: row.try_get("date_created")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, input: &CreateUserInput) -> Result<User> {
    let result = sqlx::query(INSERT_USER)
        .bind(&input.fullname)
        .bind(&input.username)
        .bind(input.nickname.as_deref())
        .bind(input.date_created)
        .execute(pool)
        .await
        .context("Failed to create user")?;

    Ok(created_user(result.last_insert_id() as i64, input))
}

async fn get_user_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query(SELECT_USER_BY_ID)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by ID")?;

    row.as_ref().map(row_to_user_mysql).transpose()
}

async fn list_users_mysql(pool: &MySqlPool) -> Result<Vec<User>> {
    let rows = sqlx::query(SELECT_ALL_USERS)
        .fetch_all(pool)
        .await
        .context("Failed to list users")?;

    rows.iter().map(row_to_user_mysql).collect()
}

async fn update_user_mysql(pool: &MySqlPool, id: i64, input: &UpdateUserInput) -> Result<u64> {
    let result = sqlx::query(UPDATE_USER)
        .bind(input.fullname.as_deref())
        .bind(input.username.as_deref())
        .bind(input.nickname.as_deref())
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update user")?;

    Ok(result.rows_affected())
}

async fn delete_user_mysql(pool: &MySqlPool, id: i64) -> Result<u64> {
    let result = sqlx::query(DELETE_USER)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;

    Ok(result.rows_affected())
}

async fn exists_by_username_mysql(
    pool: &MySqlPool,
    username: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let row = sqlx::query(COUNT_USERNAME)
        .bind(username)
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
        .context("Failed to check username existence")?;

    let count: i64 = row.try_get("count")?;
    Ok(count > 0)
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        fullname: row.try_get("fullname")?,
        username: row.try_get("username")?,
        nickname: row.try_get("nickname")?,
        date_created: row.try_get("date_created")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::{SubsecRound, Utc};

    async fn setup_test_repo() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxUserRepository::new(pool)
    }

    fn create_test_input(username: &str) -> CreateUserInput {
        CreateUserInput {
            fullname: format!("Full {}", username),
            username: username.to_string(),
            nickname: None,
            date_created: Utc::now().trunc_subsecs(3),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = setup_test_repo().await;
        let created = repo.create(&create_test_input("dunder")).await.expect("Failed to create user");

        let found = repo.get_by_id(created.id).await.unwrap().expect("User should exist");
        assert_eq!(found, created);
        assert!(found.nickname.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_fails() {
        let repo = setup_test_repo().await;
        repo.create(&create_test_input("dup")).await.expect("First insert should succeed");
        assert!(repo.create(&create_test_input("dup")).await.is_err());
    }

    #[tokio::test]
    async fn test_exists_by_username() {
        let repo = setup_test_repo().await;
        let created = repo.create(&create_test_input("dunder")).await.unwrap();

        assert!(repo.exists_by_username("dunder", None).await.unwrap());
        assert!(!repo.exists_by_username("dunder", Some(created.id)).await.unwrap());
        assert!(repo.exists_by_username("dunder", Some(created.id + 1)).await.unwrap());
        assert!(!repo.exists_by_username("nobody", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_and_delete_user() {
        let repo = setup_test_repo().await;
        let created = repo.create(&create_test_input("b.deboop")).await.unwrap();

        let input = UpdateUserInput {
            nickname: Some("Bodeep".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.update(created.id, &input).await.unwrap(), 1);

        let updated = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(updated.nickname.as_deref(), Some("Bodeep"));
        assert_eq!(updated.username, "b.deboop");

        assert_eq!(repo.delete(created.id).await.unwrap(), 1);
        assert!(repo.list_all().await.unwrap().is_empty());
    }
}
