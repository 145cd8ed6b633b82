//! Source records as they appear in the bucket

use crate::types::Level;
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Page value marking an actual song play
pub const NEXT_SONG: &str = "NextSong";

/// One line of an activity log file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub artist: Option<String>,
    pub auth: Option<String>,
    pub first_name: Option<String>,
    pub gender: Option<String>,
    pub item_in_session: Option<i64>,
    pub last_name: Option<String>,
    pub length: Option<f64>,
    pub level: Option<Level>,
    pub location: Option<String>,
    pub method: Option<String>,
    pub page: Option<String>,
    pub registration: Option<f64>,
    pub session_id: Option<i64>,
    pub song: Option<String>,
    pub status: Option<i64>,
    /// Epoch milliseconds
    pub ts: Option<i64>,
    pub user_agent: Option<String>,
    /// Empty for logged-out sessions
    #[serde(default, deserialize_with = "user_id_from_text")]
    pub user_id: Option<i64>,
}

impl LogEvent {
    /// Whether this event is a song play
    pub fn is_next_song(&self) -> bool {
        self.page.as_deref() == Some(NEXT_SONG)
    }

    /// Event time (UTC)
    pub fn start_time(&self) -> Option<NaiveDateTime> {
        DateTime::from_timestamp_millis(self.ts?).map(|dt| dt.naive_utc())
    }
}

/// Accept `"42"`, `42`, `""` or null
fn user_id_from_text<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid userId '{s}'"))),
    }
}

/// One song metadata file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SongRecord {
    pub num_songs: Option<i64>,
    pub artist_id: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
    pub artist_location: Option<String>,
    pub artist_name: Option<String>,
    pub song_id: Option<String>,
    pub title: Option<String>,
    pub duration: Option<f64>,
    /// 0 when unknown
    pub year: Option<i32>,
}
