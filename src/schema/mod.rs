//! Warehouse schema module
//!
//! Creates the staging and star-schema tables.
//!
//! # Table order
//!
//! - Staging: `staging_events`, `staging_songs`
//! - Dimensions: `time`, `users`, `artists`, `songs`
//! - Fact: `songplays`
//!
//! Every table is dropped (with `CASCADE`) immediately before it is
//! created, so re-running leaves the same schema.

mod ddl;

pub use ddl::{
    all_tables, TableDef, ARTISTS, SONGPLAYS, SONGS, STAGING_EVENTS, STAGING_SONGS,
    STAGING_TABLES, STAR_TABLES, TIME, USERS,
};

use crate::error::Result;
use crate::warehouse::SqlExecutor;
use tracing::{debug, info};

/// Creates the warehouse tables
pub struct SchemaManager<'a, E> {
    executor: &'a mut E,
}

impl<'a, E: SqlExecutor> SchemaManager<'a, E> {
    pub fn new(executor: &'a mut E) -> Self {
        Self { executor }
    }

    /// Drop and recreate every table, in dependency order
    ///
    /// Stops at the first failing statement. Returns the number of tables
    /// created.
    pub async fn create_tables(&mut self) -> Result<usize> {
        let mut created = 0;
        for table in all_tables() {
            debug!(table = table.name, "Dropping table");
            self.executor.execute(&table.drop_sql()).await?;
            debug!(table = table.name, "Creating table");
            self.executor.execute(table.create).await?;
            created += 1;
        }
        info!(tables = created, "Tables created");
        Ok(created)
    }
}

#[cfg(test)]
mod tests;
