//! External content adapter: popular anime from the public feed, with a
//! built-in catalog when the feed is unreachable.
//!
//! DESIGN
//! ======
//! Feed bodies are untrusted and loosely shaped; `normalize` maps them onto
//! [`Anime`]. An empty page counts as a failure, so the dashboard never
//! renders an empty chart while the catalog is available.
//!
//! The metadata lookup (`anime_meta`) resolves against a memoized list held
//! in a `OnceCell`. The first completed fetch wins and is never invalidated,
//! even when it was served from the catalog.

pub mod catalog;
pub mod feed;
pub mod normalize;

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::fetched::Fetched;
pub use feed::{ContentError, ContentFeed, HttpContentFeed};
pub use normalize::Anime;

pub const TOP_ANIME_LIMIT: usize = 10;
pub const ANIME_LIST_PAGE_SIZE: u32 = 50;

#[derive(Clone)]
pub struct ContentAdapter {
    feed: Arc<dyn ContentFeed>,
    meta_cache: Arc<OnceCell<Fetched<Vec<Anime>>>>,
}

impl ContentAdapter {
    #[must_use]
    pub fn new(feed: Arc<dyn ContentFeed>) -> Self {
        Self { feed, meta_cache: Arc::new(OnceCell::new()) }
    }

    /// Up to ten popular titles, or the catalog's top five.
    pub async fn top_anime(&self) -> Fetched<Vec<Anime>> {
        match self.fetch_popular(None, Some(TOP_ANIME_LIMIT)).await {
            Ok(items) => Fetched::Real(items),
            Err(e) => {
                warn!(error = %e, "top anime unavailable; serving catalog");
                Fetched::Fallback(catalog::mock_top_anime())
            }
        }
    }

    /// First page of 50 popular titles, or the full catalog.
    pub async fn anime_list(&self) -> Fetched<Vec<Anime>> {
        match self.fetch_popular(Some(ANIME_LIST_PAGE_SIZE), None).await {
            Ok(items) => Fetched::Real(items),
            Err(e) => {
                warn!(error = %e, "anime list unavailable; serving catalog");
                Fetched::Fallback(catalog::mock_anime_list())
            }
        }
    }

    /// Look up one title by id or title (case-insensitive exact match first,
    /// then title substring). The source tag is that of the cached list.
    pub async fn anime_meta(&self, query: &str) -> Fetched<Option<Anime>> {
        let list = self
            .meta_cache
            .get_or_init(|| async {
                debug!("populating anime metadata cache");
                self.anime_list().await
            })
            .await;
        let needle = query.to_lowercase();
        let found = list.get().iter().find(|a| {
            a.id.to_lowercase() == needle || a.title.to_lowercase() == needle
        });
        let found = found.or_else(|| {
            list.get()
                .iter()
                .find(|a| a.title.to_lowercase().contains(&needle))
        });
        match list {
            Fetched::Real(_) => Fetched::Real(found.cloned()),
            Fetched::Fallback(_) => Fetched::Fallback(found.cloned()),
        }
    }

    /// Fetch page 1, keep at most `limit` raw items, normalize. An empty
    /// result is reported as an error.
    async fn fetch_popular(&self, per_page: Option<u32>, limit: Option<usize>) -> Result<Vec<Anime>, ContentError> {
        let body = self.feed.popular(1, per_page).await?;
        let results = normalize::extract_results(&body);
        let window = limit.map_or(results, |n| &results[..n.min(results.len())]);
        let items = normalize::normalize_all(window);
        if items.is_empty() {
            return Err(ContentError::Decode("no usable items in feed response".into()));
        }
        Ok(items)
    }
}

#[cfg(test)]
#[path = "content_test.rs"]
mod tests;
