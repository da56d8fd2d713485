//! Map loosely-shaped feed items onto [`Anime`].
//!
//! Feed responses vary by provider and version. Each field is taken from the
//! first present, non-empty candidate key; JSON `null`, `false`, `0` and `""`
//! count as absent.

use serde::Serialize;
use serde_json::Value;

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

const RESULT_KEYS: [&str; 3] = ["results", "data", "animes"];
const TITLE_CONTAINER_KEYS: [&str; 2] = ["title", "names"];
const TITLE_VARIANT_KEYS: [&str; 3] = ["english", "romaji", "userPreferred"];
const TITLE_FALLBACK_KEYS: [&str; 2] = ["name", "title"];
const IMAGE_KEYS: [&str; 3] = ["image", "cover", "coverImage"];
const ID_KEYS: [&str; 3] = ["id", "_id", "mal_id"];
const STATUS_KEYS: [&str; 2] = ["status", "type"];
const EPISODE_KEYS: [&str; 4] = ["totalEpisodes", "episodes", "episodeCount", "episodesCount"];
const RATING_KEYS: [&str; 3] = ["rating", "score", "averageScore"];
const VIEW_KEYS: [&str; 2] = ["popularity", "favourites"];
const DATE_KEYS: [&str; 3] = ["releaseDate", "startDate", "createdAt"];

/// Normalized anime record served by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Anime {
    pub id: String,
    pub title: String,
    pub image: String,
    pub status: String,
    pub episodes: Option<u32>,
    pub rating: Option<f64>,
    pub views: u64,
    pub added_date: Option<String>,
}

/// Item array from a feed page, looked up under `results`, `data`, then `animes`.
#[must_use]
pub fn extract_results(body: &Value) -> &[Value] {
    RESULT_KEYS
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Normalize one feed item. `None` when no title can be found.
#[must_use]
pub fn normalize_anime(item: &Value) -> Option<Anime> {
    let title = title_of(item)?;

    let image = IMAGE_KEYS
        .iter()
        .filter_map(|key| item.get(key))
        .find_map(text)
        .or_else(|| item.get("images").and_then(|images| images.get(0)).and_then(text))
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned());

    let id = first_present(item, &ID_KEYS)
        .and_then(identifier)
        .unwrap_or_else(|| title.clone());

    let status = first_present(item, &STATUS_KEYS)
        .and_then(text)
        .unwrap_or_else(|| {
            if item.get("isAdult").is_some_and(is_present) { "Adult" } else { "Unknown" }.to_owned()
        });

    Some(Anime {
        id,
        title,
        image,
        status,
        episodes: first_present(item, &EPISODE_KEYS).and_then(count),
        rating: first_present(item, &RATING_KEYS).and_then(number),
        views: first_present(item, &VIEW_KEYS)
            .and_then(Value::as_u64)
            .unwrap_or(0),
        added_date: first_present(item, &DATE_KEYS).and_then(date_text),
    })
}

/// Normalize every item on a page, dropping untitled ones.
#[must_use]
pub fn normalize_all(items: &[Value]) -> Vec<Anime> {
    items.iter().filter_map(normalize_anime).collect()
}

// =============================================================================
// FIELD HELPERS
// =============================================================================

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > f64::EPSILON),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn first_present<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| item.get(key))
        .find(|value| is_present(value))
}

/// `title.{english,romaji,userPreferred}` (or the same under `names`), then
/// `name`, then a plain string `title`.
fn title_of(item: &Value) -> Option<String> {
    first_present(item, &TITLE_CONTAINER_KEYS)
        .and_then(|container| first_present(container, &TITLE_VARIANT_KEYS))
        .and_then(text)
        .or_else(|| first_present(item, &TITLE_FALLBACK_KEYS).and_then(text))
}

fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn count(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    u32::try_from(raw).ok()
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `"2022-10-12"`, a bare year `2022`, or `{year, month, day}` with optional parts.
fn date_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(parts) => {
            let year = parts.get("year").and_then(Value::as_u64)?;
            let month = parts.get("month").and_then(Value::as_u64);
            let day = parts.get("day").and_then(Value::as_u64);
            Some(match (month, day) {
                (Some(m), Some(d)) => format!("{year:04}-{m:02}-{d:02}"),
                (Some(m), None) => format!("{year:04}-{m:02}"),
                _ => format!("{year:04}"),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
