//! User management routes. All require a live session.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use super::RouteError;
use crate::api::types::{CreateUserInput, User, UserPatch, Watchlist};
use crate::fetched::Envelope;
use crate::state::AppState;

/// `GET /api/users`
pub async fn list(State(state): State<AppState>) -> Result<Json<Envelope<Vec<User>>>, RouteError> {
    Ok(Json(state.console.list_users().await?.into()))
}

/// `POST /api/users`
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<Envelope<User>>), RouteError> {
    let created = state.console.create_user(&input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// `GET /api/users/{id}`
pub async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Envelope<User>>, RouteError> {
    Ok(Json(state.console.get_user(id).await?.into()))
}

/// `PUT /api/users/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<Envelope<User>>, RouteError> {
    Ok(Json(state.console.update_user(id, &patch).await?.into()))
}

/// `DELETE /api/users/{id}`
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Envelope<()>>, RouteError> {
    Ok(Json(state.console.delete_user(id).await?.into()))
}

/// `GET /api/users/{id}/watchlist`
pub async fn watchlist(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<Vec<Watchlist>>>, RouteError> {
    Ok(Json(state.console.user_watchlist(id).await?.into()))
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
