//! Integration tests over the fixture dataset
//!
//! Tests the flows that need no cluster: source files → star schema,
//! config generation → save → reload, and the full statement script
//! produced by create-tables, etl and analytics.

use pretty_assertions::assert_eq;
use sparkify_dwh::analytics::{AnalyticsRunner, QUERIES};
use sparkify_dwh::config::{ConfigAnswers, DwhConfig};
use sparkify_dwh::credentials::parse_credentials_csv;
use sparkify_dwh::dataset::SourceBucket;
use sparkify_dwh::loader::{CopySources, Loader};
use sparkify_dwh::model::{LogEvent, SongRecord, StarSchema};
use sparkify_dwh::schema::SchemaManager;
use sparkify_dwh::warehouse::{ResultSet, ScriptExecutor};
use sparkify_dwh::{EtlMode, Error};
use std::collections::HashSet;
use std::path::Path;
use tempfile::TempDir;

fn fixtures() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
}

fn fixture_config() -> DwhConfig {
    DwhConfig::load(fixtures().join("dwh.toml")).unwrap()
}

// ============================================================================
// Fixture dataset → star schema
// ============================================================================

async fn fixture_star() -> (Vec<LogEvent>, StarSchema) {
    let bucket = SourceBucket::local(fixtures()).unwrap();
    let events: Vec<LogEvent> = bucket.read_records("log_data.json").await.unwrap();
    let songs: Vec<SongRecord> = bucket.read_records("song_data.json").await.unwrap();
    let star = StarSchema::derive(&events, &songs);
    (events, star)
}

#[tokio::test]
async fn test_fixture_star_schema() {
    let (events, star) = fixture_star().await;

    let next_song = events.iter().filter(|e| e.is_next_song()).count();
    assert_eq!(next_song, 3);
    assert_eq!(star.songplays.len(), next_song);
    assert_eq!(star.songs.len(), 2);
    assert!(star.artists.len() <= 2);
    assert!(star.time.len() <= 3);

    let unresolved = star
        .songplays
        .iter()
        .filter(|p| p.song_id.is_none() && p.artist_id.is_none())
        .count();
    assert_eq!(unresolved, 1);
}

#[tokio::test]
async fn test_fixture_users_appear_once() {
    let (events, star) = fixture_star().await;

    let logged: HashSet<i64> = events.iter().filter_map(|e| e.user_id).collect();
    let users: Vec<i64> = star.users.iter().map(|u| u.user_id).collect();
    let distinct: HashSet<i64> = users.iter().copied().collect();

    assert_eq!(users.len(), distinct.len());
    assert_eq!(distinct, logged);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dwh.toml");

    let config = fixture_config();
    config.save(&path).unwrap();

    assert_eq!(DwhConfig::load(&path).unwrap(), config);
}

#[test]
fn test_generated_config_through_provisioning() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dwh.toml");
    let key = parse_credentials_csv(
        "\u{feff}Access key ID,Secret access key\nAKIATEST,abc/def+ghi\n",
    )
    .unwrap();

    let config = DwhConfig::generate(
        &key,
        &ConfigAnswers {
            cluster_identifier: Some("my-cluster".to_string()),
            ..ConfigAnswers::default()
        },
    );
    config.validate().unwrap();
    config.save(&path).unwrap();

    let loaded = DwhConfig::load(&path).unwrap();
    assert_eq!(loaded.cluster.identifier, "my-cluster");
    assert_eq!(loaded.aws.secret, "abc/def+ghi");
    assert!(matches!(
        loaded.role_arn(),
        Err(Error::MissingConfigField { .. })
    ));

    let provisioned = loaded
        .with_role_arn("arn:aws:iam::123456789012:role/r")
        .with_host("my-cluster.example.com");
    provisioned.save(&path).unwrap();
    let reloaded = DwhConfig::load(&path).unwrap();
    assert_eq!(reloaded.db_host().unwrap(), "my-cluster.example.com");

    reloaded.cleared_provisioning().save(&path).unwrap();
    assert!(DwhConfig::load(&path).unwrap().db_host().is_err());
}

// ============================================================================
// Scripted warehouse session
// ============================================================================

#[tokio::test]
async fn test_full_statement_script() {
    let config = fixture_config();
    let mut script = ScriptExecutor::new().with_result(ResultSet::new(
        vec!["songplay_id".to_string()],
        vec![vec![Some("0".to_string())]],
    ));

    let created = SchemaManager::new(&mut script).create_tables().await.unwrap();
    assert_eq!(created, 7);
    let schema_statements = script.take_statements();
    assert_eq!(schema_statements.len(), 14);
    assert_eq!(
        schema_statements[0],
        "DROP TABLE IF EXISTS staging_events CASCADE"
    );

    let sources = CopySources::from_config(&config, EtlMode::Test).unwrap();
    let stats = Loader::new(&mut script, sources).run().await.unwrap();
    assert_eq!(stats.tables_staged, 2);
    assert_eq!(stats.inserted.len(), 5);

    let load_statements = script.take_statements();
    let copies: Vec<&String> = load_statements
        .iter()
        .filter(|s| s.starts_with("COPY"))
        .collect();
    assert_eq!(copies.len(), 2);
    assert!(copies[0].contains("s3://udacity-dend/log-data/2018/11/2018-11-01-events.json"));
    assert!(copies[1].contains("s3://udacity-dend/song-data/A/A/A"));
    assert!(load_statements
        .last()
        .unwrap()
        .starts_with("INSERT INTO songplays"));

    let results = AnalyticsRunner::new(&mut script).run_all().await.unwrap();
    assert_eq!(results.len(), QUERIES.len());
    assert_eq!(results[0].1.scalar(), Some("0"));
    assert_eq!(script.statements().len(), QUERIES.len());
}
