//! Source dataset module
//!
//! Browse and read the song and log files the warehouse loads from.
//!
//! # Layout
//!
//! - Songs: `song_data/A/B/C/TRABCxxx.json`, one JSON object per file,
//!   sharded by the 3rd to 5th characters of the track id
//! - Logs: `log_data/YYYY/MM/YYYY-MM-DD-events.json`, one event per line
//! - JSONPaths: a single JSON document mapping log fields to columns

mod bucket;
mod types;

pub use bucket::{parse_records, split_s3_url, validate_song_prefix, SourceBucket};
pub use types::ObjectInfo;
