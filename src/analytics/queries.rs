//! Canned read-only queries over the star schema

/// A query and a short description of what it shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    pub summary: &'static str,
    /// Column headers, used when the query returns no rows
    pub columns: &'static [&'static str],
    pub sql: &'static str,
}

pub static QUERIES: [Query; 7] = [
    Query {
        summary: "Show five songplays",
        columns: &["start_time", "user_id", "level", "location"],
        sql: "SELECT start_time, user_id, level, location
FROM songplays
ORDER BY start_time
LIMIT 5",
    },
    Query {
        summary: "Show the top 10 most popular songs",
        columns: &["title", "name", "num_plays"],
        sql: "SELECT s.title, a.name, COUNT(sp.songplay_id) AS num_plays
FROM songplays AS sp
JOIN artists AS a ON sp.artist_id = a.artist_id
JOIN songs AS s ON sp.song_id = s.song_id
GROUP BY s.title, a.name
ORDER BY num_plays DESC, s.title
LIMIT 10",
    },
    Query {
        summary: "Show the five most popular artists",
        columns: &["name", "num_plays"],
        sql: "SELECT a.name, COUNT(sp.songplay_id) AS num_plays
FROM artists AS a
JOIN songplays AS sp ON a.artist_id = sp.artist_id
GROUP BY a.name
ORDER BY num_plays DESC, a.name
LIMIT 5",
    },
    Query {
        summary: "Show the five users with the most songplays",
        columns: &["first_name", "last_name", "num_plays"],
        sql: "SELECT u.first_name, u.last_name, COUNT(sp.songplay_id) AS num_plays
FROM songplays AS sp
JOIN users AS u ON u.user_id = sp.user_id
GROUP BY u.first_name, u.last_name
ORDER BY num_plays DESC, u.last_name
LIMIT 5",
    },
    Query {
        summary: "Show the number of users in each level",
        columns: &["level", "num_users"],
        sql: "SELECT level, COUNT(user_id) AS num_users
FROM users
GROUP BY level
ORDER BY level",
    },
    Query {
        summary: "Show songplays by hour of day",
        columns: &["hour", "num_plays"],
        sql: "SELECT t.hour, COUNT(sp.songplay_id) AS num_plays
FROM songplays AS sp
JOIN time AS t ON t.start_time = sp.start_time
GROUP BY t.hour
ORDER BY t.hour",
    },
    Query {
        summary: "Show how many songplays were matched to a song",
        columns: &["total_plays", "resolved_plays", "unresolved_plays"],
        sql: "SELECT COUNT(*) AS total_plays,
       COUNT(song_id) AS resolved_plays,
       COUNT(*) - COUNT(song_id) AS unresolved_plays
FROM songplays",
    },
];
