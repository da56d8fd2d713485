//! Dashboard and content routes. Read-only; served without a session.

use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::content::Anime;
use crate::dashboard::{Activity, Analytics};
use crate::fetched::Envelope;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct MetaQuery {
    #[serde(default)]
    q: String,
}

/// `GET /api/dashboard/analytics`
pub async fn analytics(State(state): State<AppState>) -> Json<Analytics> {
    Json(state.dashboard.analytics(OffsetDateTime::now_utc().date()))
}

/// `GET /api/dashboard/activity`
pub async fn activity(State(state): State<AppState>) -> Json<Vec<Activity>> {
    Json(state.dashboard.recent_activity())
}

/// `GET /api/dashboard/top-anime`
pub async fn top_anime(State(state): State<AppState>) -> Json<Envelope<Vec<Anime>>> {
    Json(state.dashboard.top_anime().await.into())
}

/// `GET /api/content/anime`
pub async fn anime_list(State(state): State<AppState>) -> Json<Envelope<Vec<Anime>>> {
    Json(state.dashboard.anime_list().await.into())
}

/// `GET /api/content/anime/meta?q=`
pub async fn anime_meta(State(state): State<AppState>, Query(query): Query<MetaQuery>) -> Json<Envelope<Option<Anime>>> {
    Json(state.dashboard.anime_meta(&query.q).await.into())
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
