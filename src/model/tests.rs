//! Model tests

use super::*;
use crate::types::Level;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use test_case::test_case;

fn parse_lines<T: serde::de::DeserializeOwned>(content: &str) -> Vec<T> {
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn events() -> Vec<LogEvent> {
    parse_lines(include_str!("../../tests/fixtures/log_data.json"))
}

fn songs() -> Vec<SongRecord> {
    parse_lines(include_str!("../../tests/fixtures/song_data.json"))
}

// ============================================================================
// Records
// ============================================================================

#[test_case(r#"{"userId": "26"}"#, Some(26) ; "text")]
#[test_case(r#"{"userId": 26}"#, Some(26) ; "number")]
#[test_case(r#"{"userId": ""}"#, None ; "empty")]
#[test_case(r#"{"userId": null}"#, None ; "null")]
#[test_case(r#"{}"#, None ; "absent")]
fn test_user_id_forms(json: &str, expected: Option<i64>) {
    let event: LogEvent = serde_json::from_str(json).unwrap();
    assert_eq!(event.user_id, expected);
}

#[test]
fn test_user_id_rejects_text() {
    let err = serde_json::from_str::<LogEvent>(r#"{"userId": "abc"}"#).unwrap_err();
    assert!(err.to_string().contains("invalid userId"));
}

#[test]
fn test_event_fields() {
    let events = events();
    assert_eq!(events.len(), 4);

    let first = &events[0];
    assert!(first.is_next_song());
    assert_eq!(first.first_name.as_deref(), Some("Ryann"));
    assert_eq!(first.level, Some(Level::Free));
    assert_eq!(first.session_id, Some(583));
    assert_eq!(
        first.start_time(),
        NaiveDate::from_ymd_opt(2018, 11, 5).and_then(|d| d.and_hms_milli_opt(17, 42, 58, 796))
    );
    assert!(!events[1].is_next_song());
    assert_eq!(events[1].user_id, None);
}

#[test]
fn test_song_fields() {
    let songs = songs();
    assert_eq!(songs.len(), 2);
    assert_eq!(songs[0].year, Some(0));
    assert_eq!(songs[0].artist_latitude, None);
    assert_eq!(songs[1].artist_name.as_deref(), Some("The Box Tops"));
}

// ============================================================================
// Derivation
// ============================================================================

#[test]
fn test_derive_counts() {
    let star = StarSchema::derive(&events(), &songs());
    assert_eq!(
        star.counts(),
        vec![
            ("artists", 2),
            ("songs", 2),
            ("users", 2),
            ("time", 3),
            ("songplays", 3)
        ]
    );
}

#[test]
fn test_unresolved_play_keeps_null_ids() {
    let star = StarSchema::derive(&events(), &songs());

    let unresolved: Vec<&SongplayRow> = star
        .songplays
        .iter()
        .filter(|p| p.song_id.is_none())
        .collect();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].artist_id, None);
    assert_eq!(unresolved[0].user_id, Some(8));

    let resolved = &star.songplays[0];
    assert_eq!(resolved.song_id.as_deref(), Some("SOMZWCG12A8C13C480"));
    assert_eq!(resolved.artist_id.as_deref(), Some("ARD7TVE1187B99BFB1"));
}

#[test]
fn test_latest_level_wins() {
    let star = StarSchema::derive(&events(), &songs());
    let ryann = star.users.iter().find(|u| u.user_id == 26).unwrap();
    assert_eq!(ryann.level, Level::Paid);
    assert_eq!(star.users.iter().filter(|u| u.user_id == 26).count(), 1);
}

#[test]
fn test_latest_level_wins_regardless_of_order() {
    let mut events = events();
    events.reverse();
    let star = StarSchema::derive(&events, &songs());
    let ryann = star.users.iter().find(|u| u.user_id == 26).unwrap();
    assert_eq!(ryann.level, Level::Paid);
}

#[test]
fn test_song_year_zero_is_unknown() {
    let star = StarSchema::derive(&[], &songs());
    let casual = star
        .songs
        .iter()
        .find(|s| s.song_id == "SOMZWCG12A8C13C480")
        .unwrap();
    assert_eq!(casual.year, None);
    let box_tops = star
        .songs
        .iter()
        .find(|s| s.song_id == "SOCIWDW12A8C13D406")
        .unwrap();
    assert_eq!(box_tops.year, Some(1969));
}

#[test]
fn test_duplicate_songs_collapse() {
    let mut songs = songs();
    songs.extend(songs.clone());
    let star = StarSchema::derive(&[], &songs);
    assert_eq!(star.songs.len(), 2);
    assert_eq!(star.artists.len(), 2);
}

#[test]
fn test_time_rows_are_distinct_next_song_timestamps() {
    let mut events = events();
    events.push(events[0].clone());
    let star = StarSchema::derive(&events, &songs());

    assert_eq!(star.time.len(), 3);
    // the Home page event is not a play
    assert!(star
        .time
        .iter()
        .all(|t| t.start_time.and_utc().timestamp_millis() != 1_541_440_000_000));
}

#[test_case(2018, 11, 5, true ; "monday")]
#[test_case(2018, 11, 9, true ; "friday")]
#[test_case(2018, 11, 10, false ; "saturday")]
#[test_case(2018, 11, 11, false ; "sunday")]
fn test_weekday(year: i32, month: u32, day: u32, expected: bool) {
    let ts = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap();
    let row = TimeRow::from_timestamp(ts);
    assert_eq!(row.weekday, expected);
    assert_eq!(row.hour, 12);
    assert_eq!(row.week, 45);
}

#[test]
fn test_time_fields() {
    let star = StarSchema::derive(&events(), &songs());
    let sunday = star.time.last().unwrap();
    assert_eq!(
        (sunday.hour, sunday.day, sunday.month, sunday.year),
        (3, 11, 11, 2018)
    );
    assert!(!sunday.weekday);
}

#[test]
fn test_preview_tables() {
    let star = StarSchema::derive(&events(), &songs());
    let tables = star.tables(2).unwrap();

    let names: Vec<&str> = tables.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["artists", "songs", "users", "time", "songplays"]);

    let (_, songplays) = &tables[4];
    assert_eq!(songplays.len(), 2);
    assert_eq!(songplays.columns[0], "songplay_id");
    assert_eq!(songplays.rows[0][3].as_deref(), Some("free"));

    let (_, users) = &tables[2];
    assert_eq!(users.columns.last().map(String::as_str), Some("level"));
}

#[test]
fn test_artist_row_prefers_known_year() {
    let song = |song_id: &str, year: Option<i32>, location: &str| SongRecord {
        artist_id: Some("AR1".to_string()),
        artist_name: Some("Band".to_string()),
        artist_location: Some(location.to_string()),
        song_id: Some(song_id.to_string()),
        title: Some(song_id.to_string()),
        year,
        ..SongRecord::default()
    };
    let songs = vec![song("SOA", None, "Nowhere"), song("SOB", Some(1999), "Austin")];

    let star = StarSchema::derive(&[], &songs);

    assert_eq!(star.artists.len(), 1);
    assert_eq!(star.artists[0].location.as_deref(), Some("Austin"));
}
