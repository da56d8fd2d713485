use std::sync::Arc;

use animedash::api::HttpTransport;
use animedash::config::Config;
use animedash::content::HttpContentFeed;
use animedash::session::storage::{FileTokenStore, MemoryTokenStore, TokenStore};
use animedash::{routes, state};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = Config::from_env().expect("invalid configuration");
    tracing::debug!(?config, "configuration loaded");

    let transport = HttpTransport::new(&config.api_base_url, config.timeouts).expect("backend client init failed");
    let feed =
        HttpContentFeed::new(&config.content_feed_base_url, config.timeouts).expect("content feed client init failed");

    let tokens: Arc<dyn TokenStore> = match &config.session_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "persisting session token to file");
            Arc::new(FileTokenStore::new(path.clone()))
        }
        None => Arc::new(MemoryTokenStore::new()),
    };

    if config.guest_login_enabled {
        tracing::warn!("guest login enabled: POST /api/auth/guest grants admin without backend verification");
    }

    let port = config.port;
    let state = state::AppState::new(config, Arc::new(transport), Arc::new(feed), tokens);

    // Resume a persisted session, if any (non-fatal).
    if let Some(user) = state.session.restore().await {
        tracing::info!(user_id = user.id, username = %user.username, "resumed stored session");
    }

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "animedash listening");
    axum::serve(listener, app).await.expect("server failed");
}
