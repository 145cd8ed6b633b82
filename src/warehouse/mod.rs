//! Warehouse connection module
//!
//! `SqlExecutor` is the seam every SQL-issuing component is written
//! against. `RedshiftConnection` implements it over sqlx; `ScriptExecutor`
//! records statements for dry runs.

mod executor;
mod redshift;

pub use executor::{ResultSet, ScriptExecutor, SqlExecutor};
pub use redshift::RedshiftConnection;
