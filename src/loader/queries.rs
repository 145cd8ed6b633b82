//! COPY and INSERT statements for the load

use super::types::CopySources;

/// Quote a string literal for SQL text (single quotes doubled)
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Bulk-copy the event logs into `staging_events`
pub fn copy_staging_events(sources: &CopySources) -> String {
    format!(
        "COPY staging_events
FROM {from}
IAM_ROLE {role}
REGION {region}
TIMEFORMAT AS 'epochmillisecs'
TRUNCATECOLUMNS BLANKSASNULL EMPTYASNULL
JSON {jsonpath}",
        from = quote_literal(&sources.log_data),
        role = quote_literal(&sources.role_arn),
        region = quote_literal(&sources.region),
        jsonpath = quote_literal(&sources.log_jsonpath),
    )
}

/// Bulk-copy the song metadata into `staging_songs`
pub fn copy_staging_songs(sources: &CopySources) -> String {
    format!(
        "COPY staging_songs
FROM {from}
IAM_ROLE {role}
REGION {region}
TRUNCATECOLUMNS BLANKSASNULL EMPTYASNULL
JSON 'auto'",
        from = quote_literal(&sources.song_data),
        role = quote_literal(&sources.role_arn),
        region = quote_literal(&sources.region),
    )
}

/// New artists, one row per artist id
pub const INSERT_ARTISTS: &str = "INSERT INTO artists (artist_id, name, location, latitude, longitude)
SELECT s.artist_id, s.artist_name, s.artist_location, s.artist_latitude, s.artist_longitude
FROM (
    SELECT artist_id, artist_name, artist_location, artist_latitude, artist_longitude,
           ROW_NUMBER() OVER (PARTITION BY artist_id ORDER BY year DESC NULLS LAST, song_id) AS rn
    FROM staging_songs
    WHERE artist_id IS NOT NULL AND artist_name IS NOT NULL
) s
LEFT JOIN artists a ON a.artist_id = s.artist_id
WHERE s.rn = 1 AND a.artist_id IS NULL";

/// New songs, one row per song id (year 0 means unknown)
pub const INSERT_SONGS: &str = "INSERT INTO songs (song_id, title, artist_id, year, duration)
SELECT s.song_id, s.title, s.artist_id, NULLIF(s.year, 0), s.duration
FROM (
    SELECT song_id, title, artist_id, year, duration,
           ROW_NUMBER() OVER (PARTITION BY song_id ORDER BY artist_id) AS rn
    FROM staging_songs
    WHERE song_id IS NOT NULL AND title IS NOT NULL AND artist_id IS NOT NULL
) s
LEFT JOIN songs t ON t.song_id = s.song_id
WHERE s.rn = 1 AND t.song_id IS NULL";

/// Remove users about to be replaced by their latest staged row
pub const DELETE_STAGED_USERS: &str = "DELETE FROM users
WHERE user_id IN (
    SELECT DISTINCT CAST(TRIM(user_id) AS INTEGER)
    FROM staging_events
    WHERE NULLIF(TRIM(user_id), '') IS NOT NULL AND level IS NOT NULL
)";

/// Latest staged row per user
pub const INSERT_USERS: &str = "INSERT INTO users (user_id, first_name, last_name, gender, level)
SELECT e.user_id, e.first_name, e.last_name, e.gender, e.level
FROM (
    SELECT CAST(TRIM(user_id) AS INTEGER) AS user_id, first_name, last_name, gender, level,
           ROW_NUMBER() OVER (PARTITION BY TRIM(user_id) ORDER BY ts DESC) AS rn
    FROM staging_events
    WHERE NULLIF(TRIM(user_id), '') IS NOT NULL AND level IS NOT NULL
) e
WHERE e.rn = 1";

/// New play timestamps broken into calendar fields
pub const INSERT_TIME: &str = "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
SELECT DISTINCT e.ts,
       EXTRACT(hour FROM e.ts),
       EXTRACT(day FROM e.ts),
       EXTRACT(week FROM e.ts),
       EXTRACT(month FROM e.ts),
       EXTRACT(year FROM e.ts),
       CASE WHEN EXTRACT(dow FROM e.ts) BETWEEN 1 AND 5 THEN TRUE ELSE FALSE END
FROM staging_events e
LEFT JOIN time t ON t.start_time = e.ts
WHERE e.page = 'NextSong' AND e.ts IS NOT NULL AND t.start_time IS NULL";

/// One row per new NextSong event; unresolved songs keep NULL ids
pub const INSERT_SONGPLAYS: &str = "INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
SELECT e.ts,
       CAST(NULLIF(TRIM(e.user_id), '') AS INTEGER),
       e.level,
       s.song_id,
       s.artist_id,
       e.session_id,
       e.location,
       e.user_agent
FROM staging_events e
LEFT JOIN (
    SELECT song_id, artist_id, title, artist_name, duration,
           ROW_NUMBER() OVER (PARTITION BY title, artist_name, duration ORDER BY song_id) AS rn
    FROM staging_songs
) s ON s.title = e.song AND s.artist_name = e.artist AND s.duration = e.length AND s.rn = 1
LEFT JOIN songplays p
       ON p.start_time = e.ts
      AND p.session_id = e.session_id
      AND COALESCE(p.user_id, -1) = COALESCE(CAST(NULLIF(TRIM(e.user_id), '') AS INTEGER), -1)
WHERE e.page = 'NextSong' AND e.ts IS NOT NULL AND e.session_id IS NOT NULL
  AND p.songplay_id IS NULL";

/// Insert steps: dimensions first, fact table last
pub const INSERT_STEPS: [(&str, &str); 6] = [
    ("artists", INSERT_ARTISTS),
    ("songs", INSERT_SONGS),
    ("users", DELETE_STAGED_USERS),
    ("users", INSERT_USERS),
    ("time", INSERT_TIME),
    ("songplays", INSERT_SONGPLAYS),
];

/// Most recent COPY rejections with the offending value
pub fn recent_load_errors(limit: u32) -> String {
    format!(
        "SELECT le.starttime,
       TRIM(le.filename) AS filename,
       le.line_number,
       TRIM(le.colname) AS colname,
       TRIM(le.type) AS type,
       TRIM(d.value) AS value,
       le.err_code,
       TRIM(le.err_reason) AS err_reason
FROM stl_load_errors le
LEFT JOIN stl_loaderror_detail d
       ON d.query = le.query
      AND d.line_number = le.line_number
      AND d.colname = le.colname
ORDER BY le.starttime DESC
LIMIT {limit}"
    )
}
