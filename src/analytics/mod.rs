//! Analytics module
//!
//! A numbered menu of read-only queries over the star schema. Numbers are
//! 1-based, matching what `list` prints.

mod queries;

pub use queries::{Query, QUERIES};

use crate::error::{Error, Result};
use crate::warehouse::{ResultSet, SqlExecutor};
use tracing::debug;

/// Menu lines, e.g. `1    ) Show five songplays`
pub fn menu() -> Vec<String> {
    QUERIES
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{:<5}) {}", i + 1, q.summary))
        .collect()
}

/// Look up a query by its menu number
pub fn query(number: usize) -> Result<&'static Query> {
    number
        .checked_sub(1)
        .and_then(|i| QUERIES.get(i))
        .ok_or_else(|| {
            Error::config(format!(
                "No query {number}; choose a number from 1 to {}",
                QUERIES.len()
            ))
        })
}

/// Runs the canned queries
pub struct AnalyticsRunner<'a, E> {
    executor: &'a mut E,
}

impl<'a, E: SqlExecutor> AnalyticsRunner<'a, E> {
    pub fn new(executor: &'a mut E) -> Self {
        Self { executor }
    }

    /// Run one query by menu number
    pub async fn run(&mut self, number: usize) -> Result<ResultSet> {
        let query = query(number)?;
        debug!(number, summary = query.summary, "Running analytics query");
        let mut result = self.executor.query(query.sql).await?;
        if result.columns.is_empty() {
            result.columns = query.columns.iter().map(|c| (*c).to_string()).collect();
        }
        Ok(result)
    }

    /// Run every query in menu order
    pub async fn run_all(&mut self) -> Result<Vec<(&'static Query, ResultSet)>> {
        let mut results = Vec::with_capacity(QUERIES.len());
        for (i, query) in QUERIES.iter().enumerate() {
            results.push((query, self.run(i + 1).await?));
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests;
