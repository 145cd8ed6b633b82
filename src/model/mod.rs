//! Data model module
//!
//! Typed source records (`LogEvent`, `SongRecord`) and the rows of the
//! five star tables. `StarSchema::derive` builds those rows in memory with
//! the same rules the warehouse load applies:
//!
//! - only `NextSong` events become songplays and time rows
//! - a play resolves to a song on title, artist name and duration; plays
//!   that do not resolve keep NULL song and artist ids
//! - each user appears once, with the level from their latest event
//! - `weekday` is true Monday through Friday

mod records;
mod star;

pub use records::{LogEvent, SongRecord, NEXT_SONG};
pub use star::{ArtistRow, SongRow, SongplayRow, StarSchema, TimeRow, UserRow};

#[cfg(test)]
mod tests;
