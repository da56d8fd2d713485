use super::*;
use serde_json::json;

// =============================================================================
// extract_results
// =============================================================================

#[test]
fn results_key_preferred_then_data_then_animes() {
    assert_eq!(extract_results(&json!({"results": [1], "data": [2, 3]})).len(), 1);
    assert_eq!(extract_results(&json!({"data": [2, 3]})).len(), 2);
    assert_eq!(extract_results(&json!({"animes": [4]})), &[json!(4)]);
}

#[test]
fn missing_or_non_array_results_are_empty() {
    assert!(extract_results(&json!({})).is_empty());
    assert!(extract_results(&json!({"results": "nope"})).is_empty());
    assert!(extract_results(&json!(null)).is_empty());
}

// =============================================================================
// title
// =============================================================================

#[test]
fn title_prefers_english_then_romaji() {
    let item = json!({"title": {"romaji": "Shingeki no Kyojin", "english": "Attack on Titan"}});
    assert_eq!(normalize_anime(&item).unwrap().title, "Attack on Titan");

    let item = json!({"title": {"romaji": "Shingeki no Kyojin", "english": null}});
    assert_eq!(normalize_anime(&item).unwrap().title, "Shingeki no Kyojin");

    let item = json!({"title": {"userPreferred": "Kimetsu no Yaiba"}});
    assert_eq!(normalize_anime(&item).unwrap().title, "Kimetsu no Yaiba");
}

#[test]
fn title_from_names_name_or_plain_string() {
    assert_eq!(normalize_anime(&json!({"names": {"english": "Bleach"}})).unwrap().title, "Bleach");
    assert_eq!(normalize_anime(&json!({"name": "Mob Psycho 100"})).unwrap().title, "Mob Psycho 100");
    assert_eq!(normalize_anime(&json!({"title": "Spy x Family"})).unwrap().title, "Spy x Family");
}

#[test]
fn untitled_items_are_skipped() {
    assert!(normalize_anime(&json!({"id": 1})).is_none());
    assert!(normalize_anime(&json!({"title": {}})).is_none());
    assert!(normalize_anime(&json!({"title": ""})).is_none());

    let items = vec![json!({"title": "A"}), json!({"id": 2}), json!({"name": "B"})];
    let titles: Vec<String> = normalize_all(&items).into_iter().map(|a| a.title).collect();
    assert_eq!(titles, vec!["A", "B"]);
}

// =============================================================================
// other fields
// =============================================================================

#[test]
fn image_candidates_and_placeholder() {
    assert_eq!(normalize_anime(&json!({"title": "x", "cover": "/c.png"})).unwrap().image, "/c.png");
    assert_eq!(
        normalize_anime(&json!({"title": "x", "images": ["/first.png", "/second.png"]}))
            .unwrap()
            .image,
        "/first.png"
    );
    assert_eq!(normalize_anime(&json!({"title": "x"})).unwrap().image, PLACEHOLDER_IMAGE);
}

#[test]
fn id_from_number_string_or_title() {
    assert_eq!(normalize_anime(&json!({"title": "x", "id": 16498})).unwrap().id, "16498");
    assert_eq!(normalize_anime(&json!({"title": "x", "_id": "abc"})).unwrap().id, "abc");
    assert_eq!(normalize_anime(&json!({"title": "x", "mal_id": 5})).unwrap().id, "5");
    assert_eq!(normalize_anime(&json!({"title": "Fallback Id"})).unwrap().id, "Fallback Id");
}

#[test]
fn status_type_adult_unknown() {
    assert_eq!(normalize_anime(&json!({"title": "x", "status": "FINISHED"})).unwrap().status, "FINISHED");
    assert_eq!(normalize_anime(&json!({"title": "x", "type": "TV"})).unwrap().status, "TV");
    assert_eq!(normalize_anime(&json!({"title": "x", "isAdult": true})).unwrap().status, "Adult");
    assert_eq!(normalize_anime(&json!({"title": "x", "isAdult": false})).unwrap().status, "Unknown");
}

#[test]
fn episodes_from_any_count_key() {
    assert_eq!(normalize_anime(&json!({"title": "x", "totalEpisodes": 24})).unwrap().episodes, Some(24));
    assert_eq!(normalize_anime(&json!({"title": "x", "episodeCount": "12"})).unwrap().episodes, Some(12));
    assert_eq!(normalize_anime(&json!({"title": "x", "episodesCount": 3})).unwrap().episodes, Some(3));
    assert_eq!(normalize_anime(&json!({"title": "x"})).unwrap().episodes, None);
}

#[test]
fn rating_number_or_numeric_string() {
    assert_eq!(normalize_anime(&json!({"title": "x", "rating": 86})).unwrap().rating, Some(86.0));
    assert_eq!(normalize_anime(&json!({"title": "x", "score": "9.8"})).unwrap().rating, Some(9.8));
    assert_eq!(normalize_anime(&json!({"title": "x", "averageScore": 71})).unwrap().rating, Some(71.0));
    assert_eq!(normalize_anime(&json!({"title": "x", "rating": "n/a"})).unwrap().rating, None);
}

#[test]
fn views_from_popularity_or_favourites() {
    assert_eq!(normalize_anime(&json!({"title": "x", "popularity": 900})).unwrap().views, 900);
    assert_eq!(normalize_anime(&json!({"title": "x", "favourites": 12})).unwrap().views, 12);
    assert_eq!(normalize_anime(&json!({"title": "x"})).unwrap().views, 0);
}

#[test]
fn added_date_variants() {
    let date = |v: Value| normalize_anime(&json!({"title": "x", "startDate": v})).unwrap().added_date;
    assert_eq!(date(json!("2022-10-12")), Some("2022-10-12".into()));
    assert_eq!(date(json!(2022)), Some("2022".into()));
    assert_eq!(date(json!({"year": 2022, "month": 4, "day": 9})), Some("2022-04-09".into()));
    assert_eq!(date(json!({"year": 2022, "month": 4, "day": null})), Some("2022-04".into()));
    assert_eq!(date(json!({"year": null})), None);

    let release = normalize_anime(&json!({"title": "x", "releaseDate": "2021", "createdAt": "2020"})).unwrap();
    assert_eq!(release.added_date.as_deref(), Some("2021"));
}

#[test]
fn serializes_camel_case() {
    let anime = normalize_anime(&json!({"title": "x", "releaseDate": "2021"})).unwrap();
    let value = serde_json::to_value(anime).unwrap();
    assert_eq!(value["addedDate"], "2021");
}
