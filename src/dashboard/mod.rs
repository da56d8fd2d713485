//! Dashboard data: synthetic analytics, the recent-activity feed, and the
//! content adapter's anime views.
//!
//! Analytics are generated, not fetched. Daily and hourly variation comes
//! from an RNG seeded with the requested date, so a given day always renders
//! the same charts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use time::{Date, Duration};

use crate::content::{Anime, ContentAdapter};
use crate::fetched::Fetched;

const DAILY_WINDOW: i64 = 30;
const DAILY_BASE_USERS: i64 = 2000;
const DAILY_TREND_PER_DAY: i64 = 30;
const DAILY_VARIATION: i64 = 150;
const WEEKEND_BOOST: i64 = 500;
const HOURLY_PEAK_BASE: u64 = 8000;
const HOURLY_OFFPEAK_BASE: u64 = 3000;
const HOURLY_VARIATION: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_users: u64,
    pub active_users: u64,
    pub total_views: u64,
    pub total_content: u64,
    pub new_users_today: u64,
    pub new_content_this_week: u64,
    /// Percent.
    pub views_growth_rate: u32,
    /// Minutes.
    pub average_watch_time: u32,
    pub daily_active_users: Vec<DailyActiveUsers>,
    pub popular_genres: Vec<GenreCount>,
    pub watch_time_distribution: Vec<HourlyViews>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyActiveUsers {
    /// `"Mon D"`, e.g. `"Oct 3"`.
    pub date: String,
    pub users: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub name: &'static str,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyViews {
    /// `"H:00"`, 0 through 23.
    pub hour: String,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub id: u32,
    pub user: &'static str,
    pub action: &'static str,
    pub anime: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<&'static str>,
    pub time: &'static str,
}

#[derive(Clone)]
pub struct DashboardService {
    content: ContentAdapter,
}

impl DashboardService {
    #[must_use]
    pub fn new(content: ContentAdapter) -> Self {
        Self { content }
    }

    /// Analytics snapshot for the 30 days ending on `today`.
    #[must_use]
    pub fn analytics(&self, today: Date) -> Analytics {
        let mut rng = StdRng::seed_from_u64(u64::from(today.to_julian_day().unsigned_abs()));
        Analytics {
            total_users: 12_345,
            active_users: 4_567,
            total_views: 1_200_000,
            total_content: 2_350,
            new_users_today: 127,
            new_content_this_week: 15,
            views_growth_rate: 18,
            average_watch_time: 45,
            daily_active_users: daily_active_users(today, &mut rng),
            popular_genres: popular_genres(),
            watch_time_distribution: watch_time_distribution(&mut rng),
        }
    }

    #[must_use]
    pub fn recent_activity(&self) -> Vec<Activity> {
        recent_activity()
    }

    pub async fn top_anime(&self) -> Fetched<Vec<Anime>> {
        self.content.top_anime().await
    }

    pub async fn anime_list(&self) -> Fetched<Vec<Anime>> {
        self.content.anime_list().await
    }

    pub async fn anime_meta(&self, query: &str) -> Fetched<Option<Anime>> {
        self.content.anime_meta(query).await
    }
}

// =============================================================================
// GENERATORS
// =============================================================================

fn daily_active_users(today: Date, rng: &mut StdRng) -> Vec<DailyActiveUsers> {
    (0..DAILY_WINDOW)
        .map(|i| {
            let day = today - Duration::days(DAILY_WINDOW - 1 - i);
            let weekend = matches!(i % 7, 5 | 6);
            let users = DAILY_BASE_USERS
                + i * DAILY_TREND_PER_DAY
                + rng.random_range(-DAILY_VARIATION..DAILY_VARIATION)
                + if weekend { WEEKEND_BOOST } else { 0 };
            DailyActiveUsers { date: short_date(day), users }
        })
        .collect()
}

fn short_date(date: Date) -> String {
    let month = date.month().to_string();
    format!("{} {}", &month[..3], date.day())
}

fn popular_genres() -> Vec<GenreCount> {
    [("Action", 35), ("Romance", 28), ("Comedy", 22), ("Fantasy", 18), ("Slice of Life", 12)]
        .into_iter()
        .map(|(name, count)| GenreCount { name, count })
        .collect()
}

fn watch_time_distribution(rng: &mut StdRng) -> Vec<HourlyViews> {
    (0..24u32)
        .map(|hour| {
            let peak = hour >= 18 || hour <= 2;
            let base = if peak { HOURLY_PEAK_BASE } else { HOURLY_OFFPEAK_BASE };
            HourlyViews { hour: format!("{hour}:00"), views: base + rng.random_range(0..HOURLY_VARIATION) }
        })
        .collect()
}

fn recent_activity() -> Vec<Activity> {
    let base = Activity {
        id: 0,
        user: "",
        action: "",
        anime: "",
        episode: None,
        rating: None,
        comment: None,
        time: "",
    };
    vec![
        Activity {
            id: 1,
            user: "User 1",
            action: "watched",
            anime: "Attack on Titan",
            episode: Some("Episode 87"),
            time: "5 minutes ago",
            ..base.clone()
        },
        Activity {
            id: 2,
            user: "User 2",
            action: "rated",
            anime: "Demon Slayer",
            rating: Some(9.5),
            time: "10 minutes ago",
            ..base.clone()
        },
        Activity {
            id: 3,
            user: "User 3",
            action: "commented on",
            anime: "Jujutsu Kaisen",
            comment: Some("This episode was amazing!"),
            time: "15 minutes ago",
            ..base.clone()
        },
        Activity {
            id: 4,
            user: "User 4",
            action: "added to watchlist",
            anime: "Chainsaw Man",
            time: "25 minutes ago",
            ..base.clone()
        },
        Activity {
            id: 5,
            user: "User 5",
            action: "started watching",
            anime: "One Piece",
            time: "30 minutes ago",
            ..base
        },
    ]
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
