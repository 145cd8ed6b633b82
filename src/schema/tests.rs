//! Schema tests

use super::*;
use crate::error::{Error, Result};
use crate::warehouse::{ResultSet, ScriptExecutor, SqlExecutor};
use async_trait::async_trait;
use pretty_assertions::assert_eq;

/// Executor that fails on the first statement containing `needle`
struct FailOn {
    inner: ScriptExecutor,
    needle: &'static str,
}

#[async_trait]
impl SqlExecutor for FailOn {
    async fn execute(&mut self, sql: &str) -> Result<u64> {
        if sql.contains(self.needle) {
            return Err(Error::database("permission denied"));
        }
        self.inner.execute(sql).await
    }

    async fn query(&mut self, sql: &str) -> Result<ResultSet> {
        self.inner.query(sql).await
    }
}

fn created_tables(statements: &[String]) -> Vec<String> {
    statements
        .iter()
        .filter_map(|s| s.strip_prefix("CREATE TABLE "))
        .map(|s| s.split_whitespace().next().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_create_order() {
    let mut exec = ScriptExecutor::new();

    let created = SchemaManager::new(&mut exec).create_tables().await.unwrap();

    assert_eq!(created, 7);
    assert_eq!(
        created_tables(exec.statements()),
        vec![
            "staging_events",
            "staging_songs",
            "time",
            "users",
            "artists",
            "songs",
            "songplays"
        ]
    );
}

#[tokio::test]
async fn test_every_create_preceded_by_its_drop() {
    let mut exec = ScriptExecutor::new();
    SchemaManager::new(&mut exec).create_tables().await.unwrap();

    let statements = exec.statements();
    assert_eq!(statements.len(), 14);
    for pair in statements.chunks(2) {
        let table = pair[0]
            .strip_prefix("DROP TABLE IF EXISTS ")
            .and_then(|s| s.strip_suffix(" CASCADE"))
            .unwrap();
        assert!(
            pair[1].starts_with(&format!("CREATE TABLE {table} (")),
            "{} should create {table}",
            pair[1]
        );
    }
}

#[tokio::test]
async fn test_create_twice_is_identical() {
    let mut exec = ScriptExecutor::new();
    SchemaManager::new(&mut exec).create_tables().await.unwrap();
    let first = exec.take_statements();
    SchemaManager::new(&mut exec).create_tables().await.unwrap();

    assert_eq!(first, exec.statements());
}

#[tokio::test]
async fn test_failure_aborts_remaining() {
    let mut exec = FailOn {
        inner: ScriptExecutor::new(),
        needle: "CREATE TABLE users",
    };

    let err = SchemaManager::new(&mut exec).create_tables().await.unwrap_err();

    assert_eq!(err.to_string(), "Database error: permission denied");
    let seen = created_tables(exec.inner.statements());
    assert_eq!(seen, vec!["staging_events", "staging_songs", "time"]);
    assert_eq!(
        exec.inner.statements().last().unwrap(),
        "DROP TABLE IF EXISTS users CASCADE"
    );
}

#[test]
fn test_fact_table_references_dimensions() {
    for dim in ["time (start_time)", "users (user_id)", "songs (song_id)", "artists (artist_id)"] {
        assert!(SONGPLAYS.create.contains(&format!("REFERENCES {dim}")));
    }
    assert!(SONGPLAYS.create.contains("IDENTITY(0, 1)"));
    assert!(SONGS.create.contains("REFERENCES artists (artist_id)"));
}

#[test]
fn test_staging_events_column_order() {
    let columns: Vec<&str> = STAGING_EVENTS
        .create
        .lines()
        .skip(1)
        .filter_map(|l| l.split_whitespace().next())
        .filter(|c| *c != ")")
        .collect();
    assert_eq!(columns.first(), Some(&"artist"));
    assert_eq!(columns.last(), Some(&"user_id"));
    assert_eq!(columns.len(), 18);
}
