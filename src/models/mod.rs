//! Data models
//!
//! Database entities (Article, User) and the input types used to create and
//! partially update them.

mod article;
mod user;

pub use article::{Article, CreateArticleInput, NewArticle, UpdateArticleInput, ARTICLE_STYLES};
pub use user::{CreateUserInput, NewUser, UpdateUserInput, User};
