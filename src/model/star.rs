//! In-memory star schema
//!
//! Applies the same rules as the warehouse insert statements to a batch of
//! staged records, so a load can be previewed without a cluster.

use super::records::{LogEvent, SongRecord};
use crate::error::Result;
use crate::types::Level;
use crate::warehouse::ResultSet;
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongplayRow {
    pub songplay_id: u64,
    pub start_time: NaiveDateTime,
    pub user_id: Option<i64>,
    pub level: Option<Level>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRow {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: Option<i32>,
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRow {
    pub start_time: NaiveDateTime,
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    /// Monday through Friday
    pub weekday: bool,
}

impl TimeRow {
    pub fn from_timestamp(start_time: NaiveDateTime) -> Self {
        // Sunday is day 0, as in EXTRACT(dow ...)
        let dow = start_time.weekday().num_days_from_sunday();
        Self {
            start_time,
            hour: start_time.hour(),
            day: start_time.day(),
            week: start_time.iso_week().week(),
            month: start_time.month(),
            year: start_time.year(),
            weekday: (1..=5).contains(&dow),
        }
    }
}

/// The five star tables built from one batch of staged records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StarSchema {
    pub songplays: Vec<SongplayRow>,
    pub users: Vec<UserRow>,
    pub songs: Vec<SongRow>,
    pub artists: Vec<ArtistRow>,
    pub time: Vec<TimeRow>,
}

impl StarSchema {
    /// Build the star tables from staged events and songs
    pub fn derive(events: &[LogEvent], songs: &[SongRecord]) -> Self {
        Self {
            songplays: songplays(events, songs),
            users: users(events),
            songs: song_rows(songs),
            artists: artists(songs),
            time: time_rows(events),
        }
    }

    /// The first `limit` rows of each table, dimensions first
    pub fn tables(&self, limit: usize) -> Result<Vec<(&'static str, ResultSet)>> {
        fn head<T>(rows: &[T], limit: usize) -> &[T] {
            &rows[..rows.len().min(limit)]
        }

        Ok(vec![
            (
                "artists",
                ResultSet::from_records(
                    &["artist_id", "name", "location", "latitude", "longitude"],
                    head(&self.artists, limit),
                )?,
            ),
            (
                "songs",
                ResultSet::from_records(
                    &["song_id", "title", "artist_id", "year", "duration"],
                    head(&self.songs, limit),
                )?,
            ),
            (
                "users",
                ResultSet::from_records(
                    &["user_id", "first_name", "last_name", "gender", "level"],
                    head(&self.users, limit),
                )?,
            ),
            (
                "time",
                ResultSet::from_records(
                    &["start_time", "hour", "day", "week", "month", "year", "weekday"],
                    head(&self.time, limit),
                )?,
            ),
            (
                "songplays",
                ResultSet::from_records(
                    &[
                        "songplay_id",
                        "start_time",
                        "user_id",
                        "level",
                        "song_id",
                        "artist_id",
                        "session_id",
                        "location",
                        "user_agent",
                    ],
                    head(&self.songplays, limit),
                )?,
            ),
        ])
    }

    /// Row count per table, dimensions first
    pub fn counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("artists", self.artists.len()),
            ("songs", self.songs.len()),
            ("users", self.users.len()),
            ("time", self.time.len()),
            ("songplays", self.songplays.len()),
        ]
    }
}

/// Blank strings load as NULL
fn non_blank(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

fn artists(songs: &[SongRecord]) -> Vec<ArtistRow> {
    // newest song wins per artist, ties broken by song id
    let mut ranked: Vec<&SongRecord> = songs
        .iter()
        .filter(|s| s.artist_id.is_some() && s.artist_name.is_some())
        .collect();
    ranked.sort_by(|a, b| {
        a.artist_id
            .cmp(&b.artist_id)
            .then(b.year.cmp(&a.year))
            .then(a.song_id.cmp(&b.song_id))
    });

    let mut seen = BTreeSet::new();
    ranked
        .into_iter()
        .filter_map(|s| {
            let artist_id = s.artist_id.clone()?;
            if !seen.insert(artist_id.clone()) {
                return None;
            }
            Some(ArtistRow {
                artist_id,
                name: s.artist_name.clone()?,
                location: non_blank(s.artist_location.as_ref()),
                latitude: s.artist_latitude,
                longitude: s.artist_longitude,
            })
        })
        .collect()
}

fn song_rows(songs: &[SongRecord]) -> Vec<SongRow> {
    let mut by_id: BTreeMap<String, SongRow> = BTreeMap::new();
    for s in songs {
        let (Some(song_id), Some(title), Some(artist_id)) = (&s.song_id, &s.title, &s.artist_id)
        else {
            continue;
        };
        let row = SongRow {
            song_id: song_id.clone(),
            title: title.clone(),
            artist_id: artist_id.clone(),
            year: s.year.filter(|y| *y != 0),
            duration: s.duration,
        };
        // lowest artist id wins per song
        match by_id.get(song_id) {
            Some(existing) if existing.artist_id <= row.artist_id => {}
            _ => {
                by_id.insert(song_id.clone(), row);
            }
        }
    }
    by_id.into_values().collect()
}

fn users(events: &[LogEvent]) -> Vec<UserRow> {
    let mut latest: BTreeMap<i64, (i64, UserRow)> = BTreeMap::new();
    for e in events {
        let (Some(user_id), Some(level)) = (e.user_id, e.level) else {
            continue;
        };
        let ts = e.ts.unwrap_or(i64::MIN);
        if latest.get(&user_id).is_some_and(|(seen, _)| *seen > ts) {
            continue;
        }
        latest.insert(
            user_id,
            (
                ts,
                UserRow {
                    user_id,
                    first_name: e.first_name.clone(),
                    last_name: e.last_name.clone(),
                    gender: e.gender.clone(),
                    level,
                },
            ),
        );
    }
    latest.into_values().map(|(_, row)| row).collect()
}

fn time_rows(events: &[LogEvent]) -> Vec<TimeRow> {
    events
        .iter()
        .filter(|e| e.is_next_song())
        .filter_map(LogEvent::start_time)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(TimeRow::from_timestamp)
        .collect()
}

/// Song matching an event on title, artist name and duration
fn resolve<'a>(event: &LogEvent, songs: &'a [SongRecord]) -> Option<&'a SongRecord> {
    let (title, artist, length) = (event.song.as_ref()?, event.artist.as_ref()?, event.length?);
    songs
        .iter()
        .filter(|s| {
            s.title.as_ref() == Some(title)
                && s.artist_name.as_ref() == Some(artist)
                && s.duration == Some(length)
        })
        .min_by(|a, b| a.song_id.cmp(&b.song_id))
}

fn songplays(events: &[LogEvent], songs: &[SongRecord]) -> Vec<SongplayRow> {
    events
        .iter()
        .filter(|e| e.is_next_song())
        .filter_map(|e| Some((e, e.start_time()?, e.session_id?)))
        .zip(0u64..)
        .map(|((e, start_time, session_id), songplay_id)| {
            let song = resolve(e, songs);
            SongplayRow {
                songplay_id,
                start_time,
                user_id: e.user_id,
                level: e.level,
                song_id: song.and_then(|s| s.song_id.clone()),
                artist_id: song.and_then(|s| s.artist_id.clone()),
                session_id,
                location: e.location.clone(),
                user_agent: e.user_agent.clone(),
            }
        })
        .collect()
}
