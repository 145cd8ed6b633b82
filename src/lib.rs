// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Sparkify Data Warehouse
//!
//! Provisions a Redshift cluster, loads the Sparkify song and listening-log
//! datasets from S3 into a star schema, and runs analytic queries over it.
//!
//! ## Features
//!
//! - **Provisioning**: IAM role, cluster and ingress rule, with bounded polling
//! - **Schema**: staging tables plus a star schema centered on `songplays`
//! - **Loading**: bulk COPY into staging, then idempotent inserts
//! - **Analytics**: a numbered menu of canned queries
//! - **Preview**: derive the star tables locally from source files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sparkify_dwh::{DwhConfig, EtlMode, Result};
//! use sparkify_dwh::loader::{CopySources, Loader};
//! use sparkify_dwh::schema::SchemaManager;
//! use sparkify_dwh::warehouse::RedshiftConnection;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = DwhConfig::load("dwh.toml")?;
//!     let mut conn = RedshiftConnection::connect(&config).await?;
//!
//!     SchemaManager::new(&mut conn).create_tables().await?;
//!     let sources = CopySources::from_config(&config, EtlMode::Test)?;
//!     let stats = Loader::new(&mut conn, sources).run().await?;
//!     println!("{} songplays", stats.rows_for("songplays"));
//!
//!     conn.close().await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         CLI (Runner)                            │
//! │  config  iac  create-tables  etl  analytics  status  cleanup    │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │  Infra   │  Schema   │    Loader     │ Analytics │  Dataset    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ IAM      │ Staging   │ COPY          │ Queries   │ S3 listing  │
//! │ Redshift │ Star      │ INSERT        │ Render    │ NDJSON read │
//! │ EC2      │ DDL       │ Load errors   │           │ Preview     │
//! └──────────┴───────────┴───────┬───────┴───────────┴─────────────┘
//!                                │
//!                      SqlExecutor (sqlx / script)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Access key CSV reader
pub mod credentials;

/// Configuration file
pub mod config;

/// IAM role, cluster and ingress provisioning
pub mod infra;

/// Warehouse connection and the SQL execution seam
pub mod warehouse;

/// Table definitions and creation
pub mod schema;

/// Staging COPY and star schema inserts
pub mod loader;

/// Canned analytic queries
pub mod analytics;

/// Result rendering
pub mod output;

/// Source dataset access
pub mod dataset;

/// Typed source records and the in-memory star schema
pub mod model;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::DwhConfig;
pub use infra::{AwsProvider, InfraManager, InfraProvider};
pub use warehouse::{RedshiftConnection, ResultSet, SqlExecutor};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
