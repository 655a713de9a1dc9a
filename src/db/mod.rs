//! Database layer
//!
//! Supports:
//! - SQLite (default, for single-binary deployment)
//! - MySQL
//!
//! The driver is selected from configuration. Repositories work against the
//! [`DatabasePool`] trait and never know which backend they run on.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
