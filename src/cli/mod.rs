//! CLI module
//!
//! Command-line interface for running the warehouse.
//!
//! # Commands
//!
//! - `config` - Generate the configuration file from an access key CSV
//! - `iac` - Create the IAM role and the cluster
//! - `create-tables` - Drop and recreate every table
//! - `etl` - Copy source data into staging and fill the star schema
//! - `analytics` - Run the canned queries
//! - `status` / `pause` / `resume` / `cleanup` - Cluster lifecycle
//! - `load-errors` - Recent COPY failures
//! - `sample` - Browse the source bucket
//! - `preview` - Derive the star schema locally

mod commands;
mod prompt;
mod runner;

pub use commands::{Cli, Commands, SampleTarget};
pub use runner::Runner;
