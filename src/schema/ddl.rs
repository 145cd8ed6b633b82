//! Table definitions for the warehouse
//!
//! Staging tables mirror the source JSON. The star tables replicate the
//! small dimensions to every node (`DISTSTYLE ALL`) and distribute the fact
//! table on `song_id`.

/// A table and the statement that creates it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub create: &'static str,
}

impl TableDef {
    /// Statement dropping this table (and constraints that reference it)
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {} CASCADE", self.name)
    }
}

/// Raw log events, columns in JSONPaths order
pub const STAGING_EVENTS: TableDef = TableDef {
    name: "staging_events",
    create: "CREATE TABLE staging_events (
    artist          VARCHAR(512),
    auth            VARCHAR(32),
    first_name      VARCHAR(256),
    gender          CHAR(1),
    item_in_session INTEGER,
    last_name       VARCHAR(256),
    length          DOUBLE PRECISION,
    level           VARCHAR(8),
    location        VARCHAR(512),
    method          VARCHAR(8),
    page            VARCHAR(32),
    registration    DOUBLE PRECISION,
    session_id      INTEGER,
    song            VARCHAR(512),
    status          SMALLINT,
    ts              TIMESTAMP,
    user_agent      VARCHAR(512),
    user_id         VARCHAR(16)
)",
};

/// Raw song metadata, columns named after the JSON keys
pub const STAGING_SONGS: TableDef = TableDef {
    name: "staging_songs",
    create: "CREATE TABLE staging_songs (
    num_songs        INTEGER,
    artist_id        VARCHAR(32),
    artist_latitude  DOUBLE PRECISION,
    artist_longitude DOUBLE PRECISION,
    artist_location  VARCHAR(512),
    artist_name      VARCHAR(512),
    song_id          VARCHAR(32),
    title            VARCHAR(512),
    duration         DOUBLE PRECISION,
    year             SMALLINT
)",
};

pub const TIME: TableDef = TableDef {
    name: "time",
    create: "CREATE TABLE time (
    start_time TIMESTAMP SORTKEY NOT NULL PRIMARY KEY,
    hour       SMALLINT NOT NULL,
    day        SMALLINT NOT NULL,
    week       SMALLINT NOT NULL,
    month      SMALLINT NOT NULL,
    year       SMALLINT NOT NULL,
    weekday    BOOLEAN NOT NULL
)
DISTSTYLE ALL",
};

pub const USERS: TableDef = TableDef {
    name: "users",
    create: "CREATE TABLE users (
    user_id    INTEGER SORTKEY NOT NULL PRIMARY KEY,
    first_name VARCHAR(256),
    last_name  VARCHAR(256),
    gender     CHAR(1),
    level      VARCHAR(8) NOT NULL
)
DISTSTYLE ALL",
};

pub const ARTISTS: TableDef = TableDef {
    name: "artists",
    create: "CREATE TABLE artists (
    artist_id VARCHAR(32) SORTKEY NOT NULL PRIMARY KEY,
    name      VARCHAR(512) NOT NULL,
    location  VARCHAR(512),
    latitude  DOUBLE PRECISION,
    longitude DOUBLE PRECISION
)
DISTSTYLE ALL",
};

pub const SONGS: TableDef = TableDef {
    name: "songs",
    create: "CREATE TABLE songs (
    song_id   VARCHAR(32) SORTKEY NOT NULL PRIMARY KEY,
    title     VARCHAR(512) NOT NULL,
    artist_id VARCHAR(32) NOT NULL REFERENCES artists (artist_id),
    year      SMALLINT,
    duration  DOUBLE PRECISION
)
DISTSTYLE ALL",
};

pub const SONGPLAYS: TableDef = TableDef {
    name: "songplays",
    create: "CREATE TABLE songplays (
    songplay_id BIGINT IDENTITY(0, 1) NOT NULL PRIMARY KEY,
    start_time  TIMESTAMP SORTKEY NOT NULL REFERENCES time (start_time),
    user_id     INTEGER REFERENCES users (user_id),
    level       VARCHAR(8),
    song_id     VARCHAR(32) DISTKEY REFERENCES songs (song_id),
    artist_id   VARCHAR(32) REFERENCES artists (artist_id),
    session_id  INTEGER NOT NULL,
    location    VARCHAR(512),
    user_agent  VARCHAR(512)
)
DISTSTYLE KEY",
};

/// Staging tables, in creation order
pub const STAGING_TABLES: [TableDef; 2] = [STAGING_EVENTS, STAGING_SONGS];

/// Star tables: dimensions first (artists before songs), fact table last
pub const STAR_TABLES: [TableDef; 5] = [TIME, USERS, ARTISTS, SONGS, SONGPLAYS];

/// Every table, in creation order
pub fn all_tables() -> impl Iterator<Item = TableDef> {
    STAGING_TABLES.into_iter().chain(STAR_TABLES)
}
