//! Loader tests

use super::*;
use crate::config::DwhConfig;
use crate::error::{Error, Result};
use crate::types::EtlMode;
use crate::warehouse::{ResultSet, ScriptExecutor, SqlExecutor};
use async_trait::async_trait;
use pretty_assertions::assert_eq;

/// Executor that fails on the first statement starting with `prefix`
struct FailOn {
    inner: ScriptExecutor,
    prefix: &'static str,
}

#[async_trait]
impl SqlExecutor for FailOn {
    async fn execute(&mut self, sql: &str) -> Result<u64> {
        if sql.starts_with(self.prefix) {
            return Err(Error::database(
                "Load into table 'staging_songs' failed. Check 'stl_load_errors' system table for details.",
            ));
        }
        self.inner.execute(sql).await
    }

    async fn query(&mut self, sql: &str) -> Result<ResultSet> {
        self.inner.query(sql).await
    }
}

fn config() -> DwhConfig {
    DwhConfig::from_toml_str(include_str!("../../tests/fixtures/dwh.toml")).unwrap()
}

fn sources() -> CopySources {
    CopySources::from_config(&config(), EtlMode::Full).unwrap()
}

// ============================================================================
// COPY statements
// ============================================================================

#[test]
fn test_events_copy_statement() {
    let sql = copy_staging_events(&sources());

    assert!(sql.starts_with("COPY staging_events\nFROM 's3://udacity-dend/log-data'"));
    assert!(sql.contains("IAM_ROLE 'arn:aws:iam::123456789012:role/sparkify_redshift_role'"));
    assert!(sql.contains("REGION 'us-west-2'"));
    assert!(sql.contains("TIMEFORMAT AS 'epochmillisecs'"));
    assert!(sql.contains("TRUNCATECOLUMNS BLANKSASNULL EMPTYASNULL"));
    assert!(sql.ends_with("JSON 's3://udacity-dend/log_json_path.json'"));
}

#[test]
fn test_songs_copy_statement() {
    let sql = copy_staging_songs(&sources());

    assert!(sql.starts_with("COPY staging_songs\nFROM 's3://udacity-dend/song-data'"));
    assert!(sql.ends_with("JSON 'auto'"));
    assert!(!sql.contains("TIMEFORMAT"));
}

#[test]
fn test_test_mode_sources() {
    let sources = CopySources::from_config(&config(), EtlMode::Test).unwrap();
    assert_eq!(
        sources.log_data,
        "s3://udacity-dend/log-data/2018/11/2018-11-01-events.json"
    );
    assert_eq!(sources.song_data, "s3://udacity-dend/song-data/A/A/A");
}

#[test]
fn test_sources_require_role_arn() {
    let config = config().with_role_arn("");
    let err = CopySources::from_config(&config, EtlMode::Full).unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { .. }));
}

#[test]
fn test_quote_literal() {
    assert_eq!(quote_literal("s3://bucket/it's"), "'s3://bucket/it''s'");
    assert_eq!(quote_literal(""), "''");
}

// ============================================================================
// Staging
// ============================================================================

#[tokio::test]
async fn test_staging_recreates_then_copies() {
    let mut exec = ScriptExecutor::new();

    let staged = Loader::new(&mut exec, sources())
        .load_staging_tables()
        .await
        .unwrap();

    assert_eq!(staged, 2);
    let heads: Vec<&str> = exec
        .statements()
        .iter()
        .map(|s| s.lines().next().unwrap_or_default())
        .collect();
    assert_eq!(
        heads,
        vec![
            "DROP TABLE IF EXISTS staging_events CASCADE",
            "CREATE TABLE staging_events (",
            "COPY staging_events",
            "DROP TABLE IF EXISTS staging_songs CASCADE",
            "CREATE TABLE staging_songs (",
            "COPY staging_songs",
        ]
    );
}

#[tokio::test]
async fn test_copy_failure_is_load_error() {
    let mut exec = FailOn {
        inner: ScriptExecutor::new(),
        prefix: "COPY staging_songs",
    };

    let err = Loader::new(&mut exec, sources())
        .load_staging_tables()
        .await
        .unwrap_err();

    match err {
        Error::Load { table, message } => {
            assert_eq!(table, "staging_songs");
            assert!(message.contains("stl_load_errors"));
        }
        other => panic!("expected load error, got {other:?}"),
    }
}

// ============================================================================
// Inserts
// ============================================================================

#[tokio::test]
async fn test_insert_order_dimensions_then_fact() {
    let mut exec = ScriptExecutor::new();

    let stats = Loader::new(&mut exec, sources())
        .insert_tables()
        .await
        .unwrap();

    let tables: Vec<&str> = stats.inserted.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(tables, vec!["artists", "songs", "users", "time", "songplays"]);
    assert_eq!(exec.statements().len(), 6);
    assert!(exec.statements()[2].starts_with("DELETE FROM users"));
    assert!(exec.statements()[5].starts_with("INSERT INTO songplays"));
}

#[tokio::test]
async fn test_insert_failure_stops_sequence() {
    let mut exec = FailOn {
        inner: ScriptExecutor::new(),
        prefix: "INSERT INTO users",
    };

    let result = Loader::new(&mut exec, sources()).insert_tables().await;

    assert!(result.is_err());
    // artists, songs and the users delete ran; nothing after
    assert_eq!(exec.inner.statements().len(), 3);
}

#[test]
fn test_songplays_keep_unresolved_events() {
    let sql = INSERT_STEPS
        .iter()
        .find(|(table, _)| *table == "songplays")
        .map(|(_, sql)| *sql)
        .unwrap();
    assert!(sql.contains("LEFT JOIN (\n    SELECT song_id, artist_id, title, artist_name, duration"));
    assert!(sql.contains("s.title = e.song AND s.artist_name = e.artist AND s.duration = e.length"));
    assert!(sql.contains("e.page = 'NextSong'"));
}

#[test]
fn test_artist_row_prefers_known_year() {
    // Redshift sorts NULL first under DESC unless told otherwise
    assert!(queries::INSERT_ARTISTS.contains("ORDER BY year DESC NULLS LAST, song_id"));
}

#[test]
fn test_weekday_is_monday_to_friday() {
    let (_, sql) = INSERT_STEPS[4];
    assert!(sql.starts_with("INSERT INTO time"));
    assert!(sql.contains("EXTRACT(dow FROM e.ts) BETWEEN 1 AND 5"));
}

// ============================================================================
// Load errors
// ============================================================================

#[tokio::test]
async fn test_load_errors_query() {
    let canned = ResultSet::new(
        vec!["filename".to_string(), "err_reason".to_string()],
        vec![vec![
            Some("s3://udacity-dend/song-data/A/A/A/TRAAAAK128F9318786.json".to_string()),
            Some("Invalid digit".to_string()),
        ]],
    );
    let mut exec = ScriptExecutor::new().with_result(canned.clone());

    let result = load_errors(&mut exec, 5).await.unwrap();

    assert_eq!(result, canned);
    let sql = &exec.statements()[0];
    assert!(sql.contains("FROM stl_load_errors le"));
    assert!(sql.contains("stl_loaderror_detail"));
    assert!(sql.ends_with("LIMIT 5"));
}
