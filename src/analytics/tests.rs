//! Analytics tests

use super::*;
use crate::warehouse::{ResultSet, ScriptExecutor};
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test]
fn test_menu_is_numbered_from_one() {
    let menu = menu();
    assert_eq!(menu.len(), QUERIES.len());
    assert_eq!(menu[0], "1    ) Show five songplays");
}

#[test_case(0)]
#[test_case(8)]
#[test_case(100)]
fn test_out_of_range_query(number: usize) {
    let err = query(number).unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("from 1 to 7"));
}

#[test]
fn test_queries_are_read_only() {
    for query in QUERIES.iter() {
        assert!(query.sql.starts_with("SELECT"), "{}", query.summary);
        for word in ["INSERT", "UPDATE", "DELETE", "DROP", "CREATE"] {
            assert!(!query.sql.contains(word), "{} contains {word}", query.summary);
        }
    }
}

#[tokio::test]
async fn test_run_uses_declared_columns_for_empty_result() {
    let mut exec = ScriptExecutor::new();

    let result = AnalyticsRunner::new(&mut exec).run(5).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.columns, vec!["level", "num_users"]);
    assert!(exec.statements()[0].contains("FROM users"));
}

#[tokio::test]
async fn test_run_keeps_returned_rows() {
    let rows = ResultSet::new(
        vec!["total_plays".into(), "resolved_plays".into(), "unresolved_plays".into()],
        vec![vec![Some("3".into()), Some("2".into()), Some("1".into())]],
    );
    let mut exec = ScriptExecutor::new().with_result(rows.clone());

    let result = AnalyticsRunner::new(&mut exec).run(7).await.unwrap();

    assert_eq!(result, rows);
}

#[tokio::test]
async fn test_run_all_in_menu_order() {
    let mut exec = ScriptExecutor::new();

    let results = AnalyticsRunner::new(&mut exec).run_all().await.unwrap();

    assert_eq!(results.len(), QUERIES.len());
    let sql: Vec<&str> = exec.statements().iter().map(String::as_str).collect();
    let expected: Vec<&str> = QUERIES.iter().map(|q| q.sql).collect();
    assert_eq!(sql, expected);
}
