//! Load module
//!
//! Moves source data into the warehouse in two phases.
//!
//! # Overview
//!
//! - `load_staging_tables` - Recreate the staging tables and bulk-copy the
//!   event logs and song metadata into them
//! - `insert_tables` - Populate the star schema from staging, dimensions
//!   first and the fact table last
//!
//! Every statement autocommits. The first failure stops the sequence and
//! earlier statements stay applied.

mod queries;
mod types;

pub use queries::{
    copy_staging_events, copy_staging_songs, quote_literal, recent_load_errors, INSERT_STEPS,
};
pub use types::{CopySources, LoadStats};

use crate::error::{Error, Result};
use crate::schema::{TableDef, STAGING_EVENTS, STAGING_SONGS};
use crate::warehouse::{ResultSet, SqlExecutor};
use std::time::Instant;
use tracing::{debug, info};

/// Runs the staging and insert phases against a warehouse session
pub struct Loader<'a, E> {
    executor: &'a mut E,
    sources: CopySources,
}

impl<'a, E: SqlExecutor> Loader<'a, E> {
    pub fn new(executor: &'a mut E, sources: CopySources) -> Self {
        Self { executor, sources }
    }

    /// Recreate and bulk-copy both staging tables
    ///
    /// A COPY failure is reported as a load error naming the table.
    pub async fn load_staging_tables(&mut self) -> Result<usize> {
        let steps: [(TableDef, String); 2] = [
            (STAGING_EVENTS, copy_staging_events(&self.sources)),
            (STAGING_SONGS, copy_staging_songs(&self.sources)),
        ];

        for (table, copy) in &steps {
            self.executor.execute(&table.drop_sql()).await?;
            self.executor.execute(table.create).await?;

            info!(table = table.name, "Copying into staging table");
            let started = Instant::now();
            self.executor.execute(copy).await.map_err(|e| match e {
                Error::Database { message } => Error::load(table.name, message),
                other => other,
            })?;
            info!(
                table = table.name,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Staging table loaded"
            );
        }
        Ok(steps.len())
    }

    /// Populate the star schema from the staging tables
    pub async fn insert_tables(&mut self) -> Result<LoadStats> {
        let mut stats = LoadStats::new();
        for (table, sql) in INSERT_STEPS {
            debug!(table, "Running insert step");
            let rows = self.executor.execute(sql).await?;
            if sql.starts_with("INSERT") {
                info!(table, rows, "Inserted rows");
                stats.add_insert(table, rows);
            } else {
                debug!(table, rows, "Removed rows to be replaced");
            }
        }
        Ok(stats)
    }

    /// Both phases, timed
    pub async fn run(&mut self) -> Result<LoadStats> {
        let started = Instant::now();
        let staged = self.load_staging_tables().await?;
        let mut stats = self.insert_tables().await?;
        stats.tables_staged = staged;
        stats.set_duration(started.elapsed().as_millis() as u64);
        Ok(stats)
    }
}

/// Most recent COPY rejections, newest first
pub async fn load_errors<E: SqlExecutor>(executor: &mut E, limit: u32) -> Result<ResultSet> {
    executor.query(&recent_load_errors(limit)).await
}

#[cfg(test)]
mod tests;
