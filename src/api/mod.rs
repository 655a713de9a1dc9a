//! API layer - HTTP handlers and routing
//!
//! It includes:
//! - Article API endpoints
//! - User API endpoints

pub mod articles;
pub mod common;
pub mod middleware;
pub mod responses;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState};
pub use responses::{ArticleResponse, UserResponse};

/// Build the API router, relative to `/api`
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .nest("/articles", articles::router())
        .nest("/users", users::router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .nest("/api", build_api_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origin)),
        )
        .with_state(state)
}

/// `*` allows any origin; an unparsable origin disables cross-origin access
fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::LOCATION]);

    if origin.trim() == "*" {
        return cors.allow_origin(Any);
    }

    match origin.parse::<HeaderValue>() {
        Ok(value) => cors.allow_origin(value),
        Err(e) => {
            tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
            cors
        }
    }
}
