use super::*;
use crate::state::test_helpers::StaticFeed;
use time::macros::date;

fn service() -> DashboardService {
    DashboardService::new(ContentAdapter::new(StaticFeed::failing()))
}

// =============================================================================
// analytics
// =============================================================================

#[test]
fn analytics_totals() {
    let a = service().analytics(date!(2024 - 03 - 15));
    assert_eq!(a.total_users, 12_345);
    assert_eq!(a.active_users, 4_567);
    assert_eq!(a.total_views, 1_200_000);
    assert_eq!(a.total_content, 2_350);
    assert_eq!(a.new_users_today, 127);
    assert_eq!(a.new_content_this_week, 15);
    assert_eq!(a.views_growth_rate, 18);
    assert_eq!(a.average_watch_time, 45);
}

#[test]
fn analytics_deterministic_per_date() {
    let svc = service();
    assert_eq!(svc.analytics(date!(2024 - 03 - 15)), svc.analytics(date!(2024 - 03 - 15)));
    assert_ne!(
        svc.analytics(date!(2024 - 03 - 15)).daily_active_users,
        svc.analytics(date!(2024 - 03 - 16)).daily_active_users
    );
}

#[test]
fn daily_series_covers_thirty_days_ending_today() {
    let series = service().analytics(date!(2024 - 03 - 15)).daily_active_users;
    assert_eq!(series.len(), 30);
    assert_eq!(series[0].date, "Feb 15");
    assert_eq!(series[29].date, "Mar 15");
}

#[test]
fn daily_values_stay_within_trend_band() {
    let series = service().analytics(date!(2024 - 01 - 01)).daily_active_users;
    for (i, point) in series.iter().enumerate() {
        let i = i64::try_from(i).unwrap();
        let boost = if matches!(i % 7, 5 | 6) { 500 } else { 0 };
        let center = 2000 + 30 * i + boost;
        assert!((point.users - center).abs() <= 150, "day {i}: {}", point.users);
    }
}

#[test]
fn genres_fixed_order() {
    let genres = service().analytics(date!(2024 - 03 - 15)).popular_genres;
    let names: Vec<&str> = genres.iter().map(|g| g.name).collect();
    assert_eq!(names, vec!["Action", "Romance", "Comedy", "Fantasy", "Slice of Life"]);
    assert_eq!(genres[0].count, 35);
    assert_eq!(genres[4].count, 12);
}

#[test]
fn hourly_distribution_peaks_in_evening() {
    let hours = service().analytics(date!(2024 - 03 - 15)).watch_time_distribution;
    assert_eq!(hours.len(), 24);
    assert_eq!(hours[0].hour, "0:00");
    assert_eq!(hours[23].hour, "23:00");
    for (h, bucket) in hours.iter().enumerate() {
        let peak = h >= 18 || h <= 2;
        let floor = if peak { 8000 } else { 3000 };
        assert!(bucket.views >= floor && bucket.views < floor + 5000, "hour {h}: {}", bucket.views);
    }
}

#[test]
fn analytics_serializes_camel_case() {
    let value = serde_json::to_value(service().analytics(date!(2024 - 03 - 15))).unwrap();
    assert_eq!(value["totalUsers"], 12_345);
    assert_eq!(value["dailyActiveUsers"].as_array().unwrap().len(), 30);
    assert!(value["watchTimeDistribution"][0]["views"].is_u64());
}

// =============================================================================
// activity / content delegation
// =============================================================================

#[test]
fn recent_activity_is_fixed_five() {
    let activity = service().recent_activity();
    assert_eq!(activity.len(), 5);
    assert_eq!(activity[0].anime, "Attack on Titan");
    assert_eq!(activity[0].episode, Some("Episode 87"));
    assert_eq!(activity[1].rating, Some(9.5));
    assert_eq!(activity[2].comment, Some("This episode was amazing!"));
    assert_eq!(activity[4].time, "30 minutes ago");
}

#[test]
fn activity_omits_absent_fields() {
    let value = serde_json::to_value(service().recent_activity()).unwrap();
    assert!(value[3].get("episode").is_none());
    assert!(value[3].get("rating").is_none());
    assert_eq!(value[3]["action"], "added to watchlist");
}

#[tokio::test]
async fn content_views_delegate_to_adapter() {
    let svc = service();
    assert!(svc.top_anime().await.is_fallback());
    assert_eq!(svc.anime_list().await.get().len(), 10);
    let hit = svc.anime_meta("spy x family").await.into_inner().unwrap();
    assert_eq!(hit.id, "spy-family");
}
