//! Services layer - Business logic
//!
//! Services are responsible for:
//! - Implementing validation rules
//! - Translating request bodies into repository inputs
//! - Mapping storage outcomes to domain errors

pub mod article;
pub mod sanitize;
pub mod user;

pub use article::{ArticleService, ArticleServiceError};
pub use sanitize::sanitize_html;
pub use user::{UserService, UserServiceError};

/// Require a field to be present and not blank.
///
/// Returns the validation message naming the field otherwise.
pub(crate) fn required_field(value: Option<String>, name: &str) -> Result<String, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(format!("Missing '{}' in request body", name)),
    }
}
