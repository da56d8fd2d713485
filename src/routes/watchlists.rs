//! Watchlist routes. "my" endpoints act on the session user.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use super::RouteError;
use crate::api::types::{NewWatchlistEntry, Watchlist, WatchlistCheck};
use crate::fetched::Envelope;
use crate::state::AppState;

/// `GET /api/watchlists`
pub async fn all(State(state): State<AppState>) -> Result<Json<Envelope<Vec<Watchlist>>>, RouteError> {
    Ok(Json(state.console.all_watchlists().await?.into()))
}

/// `GET /api/watchlists/my`
pub async fn mine(State(state): State<AppState>) -> Result<Json<Envelope<Vec<Watchlist>>>, RouteError> {
    Ok(Json(state.console.my_watchlist().await?.into()))
}

/// `POST /api/watchlists/my/anime`
pub async fn add(
    State(state): State<AppState>,
    Json(entry): Json<NewWatchlistEntry>,
) -> Result<(StatusCode, Json<Envelope<Watchlist>>), RouteError> {
    let added = state.console.add_to_watchlist(&entry).await?;
    Ok((StatusCode::CREATED, Json(added.into())))
}

/// `GET /api/watchlists/my/anime/{title}`
pub async fn contains(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Envelope<WatchlistCheck>>, RouteError> {
    let exists = state.console.watchlist_contains(&title).await?;
    Ok(Json(exists.map(|exists| WatchlistCheck { exists }).into()))
}

/// `DELETE /api/watchlists/my/anime/{title}`
pub async fn remove(State(state): State<AppState>, Path(title): Path<String>) -> Result<Json<Envelope<()>>, RouteError> {
    Ok(Json(state.console.remove_from_watchlist(&title).await?.into()))
}

#[cfg(test)]
#[path = "watchlists_test.rs"]
mod tests;
