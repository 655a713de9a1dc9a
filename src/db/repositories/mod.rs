//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific table.

pub mod article;
pub mod user;

pub use article::{ArticleRepository, SqlxArticleRepository};
pub use user::{SqlxUserRepository, UserRepository};
