//! SQL execution seam

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::VecDeque;

/// Rows returned by a query, every value in its text form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    /// Column names in select order
    pub columns: Vec<String>,
    /// Row values; `None` is SQL NULL
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Result set built from serializable records, keeping `columns` in order
    ///
    /// Fields missing from a record come out as NULL.
    pub fn from_records<T: Serialize>(columns: &[&str], records: &[T]) -> Result<Self> {
        let rows = records
            .iter()
            .map(|record| -> Result<Vec<Option<String>>> {
                let value = serde_json::to_value(record)?;
                Ok(columns
                    .iter()
                    .map(|c| match value.get(*c) {
                        None | Some(serde_json::Value::Null) => None,
                        Some(serde_json::Value::String(s)) => Some(s.clone()),
                        Some(other) => Some(other.to_string()),
                    })
                    .collect())
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(
            columns.iter().map(|c| (*c).to_string()).collect(),
            rows,
        ))
    }

    /// First column of the first row
    pub fn scalar(&self) -> Option<&str> {
        self.rows.first()?.first()?.as_deref()
    }

    /// Rows as JSON objects keyed by column name
    pub fn to_json(&self) -> serde_json::Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let object = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(name, value)| {
                        let value = value
                            .as_ref()
                            .map_or(serde_json::Value::Null, |v| v.clone().into());
                        (name.clone(), value)
                    })
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}

/// Runs SQL text against the warehouse
///
/// Each call runs in autocommit mode: a failed statement leaves earlier
/// statements committed.
#[async_trait]
pub trait SqlExecutor: Send {
    /// Run a statement, returning the number of rows affected
    async fn execute(&mut self, sql: &str) -> Result<u64>;

    /// Run a query and collect every row
    async fn query(&mut self, sql: &str) -> Result<ResultSet>;
}

/// Executor that records statements instead of running them
///
/// Used for `--dry-run`. Queries return queued results in order, then
/// empty result sets.
#[derive(Debug, Default)]
pub struct ScriptExecutor {
    statements: Vec<String>,
    results: VecDeque<ResultSet>,
}

impl ScriptExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result for the next query
    #[must_use]
    pub fn with_result(mut self, result: ResultSet) -> Self {
        self.results.push_back(result);
        self
    }

    /// Statements seen so far, in order
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Take the recorded statements, leaving the log empty
    pub fn take_statements(&mut self) -> Vec<String> {
        std::mem::take(&mut self.statements)
    }
}

#[async_trait]
impl SqlExecutor for ScriptExecutor {
    async fn execute(&mut self, sql: &str) -> Result<u64> {
        self.statements.push(sql.to_string());
        Ok(0)
    }

    async fn query(&mut self, sql: &str) -> Result<ResultSet> {
        self.statements.push(sql.to_string());
        Ok(self.results.pop_front().unwrap_or_default())
    }
}
