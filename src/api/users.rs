//! User API endpoints
//!
//! Same shape as the article endpoints, under /api/users.

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
use super::responses::UserResponse;
use crate::models::{NewUser, UpdateUserInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).patch(update_user).delete(delete_user))
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.user_service.list_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.get_by_id(id).await?;
    Ok(Json(user.into()))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let fields: NewUser = parse_json_body(&body)?;
    let user = state.user_service.create(fields).await?;

    let location = format!("/api/users/{}", user.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(UserResponse::from(user)),
    ))
}

/// PATCH /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let fields: UpdateUserInput = parse_json_body(&body)?;
    state.user_service.update(id, fields).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.user_service.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
