//! Article API endpoints
//!
//! Handles HTTP requests for article operations:
//! - GET /api/articles - List all articles
//! - GET /api/articles/{id} - Get article by ID
//! - POST /api/articles - Create article
//! - PATCH /api/articles/{id} - Partially update article
//! - DELETE /api/articles/{id} - Delete article

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::common::parse_json_body;
use super::middleware::{ApiError, AppState};
use super::responses::ArticleResponse;
use crate::models::{NewArticle, UpdateArticleInput};

/// Build the articles router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_articles).post(create_article))
        .route(
            "/{id}",
            get(get_article).patch(update_article).delete(delete_article),
        )
}

/// GET /api/articles
pub async fn list_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArticleResponse>>, ApiError> {
    let articles = state.article_service.list_all().await?;
    Ok(Json(articles.into_iter().map(ArticleResponse::from).collect()))
}

/// GET /api/articles/{id}
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ArticleResponse>, ApiError> {
    let article = state.article_service.get_by_id(id).await?;
    Ok(Json(article.into()))
}

/// POST /api/articles
///
/// Responds 201 with the created article and its location.
pub async fn create_article(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let fields: NewArticle = parse_json_body(&body)?;
    let article = state.article_service.create(fields).await?;

    let location = format!("/api/articles/{}", article.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ArticleResponse::from(article)),
    ))
}

/// PATCH /api/articles/{id}
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let fields: UpdateArticleInput = parse_json_body(&body)?;
    state.article_service.update(id, fields).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/articles/{id}
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.article_service.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
