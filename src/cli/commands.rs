//! CLI commands and argument parsing

use crate::config::DEFAULT_CONFIG_PATH;
use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sparkify data warehouse on Amazon Redshift
#[derive(Parser, Debug)]
#[command(name = "sparkify-dwh")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(
        short = 'C',
        long,
        global = true,
        env = "DWH_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the SQL instead of running it (create-tables, etl)
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the configuration file from an access key CSV
    Config {
        /// Access key CSV downloaded from the IAM console
        #[arg(short, long, default_value = "credentials.csv")]
        input: PathBuf,

        /// Use the project defaults without prompting
        #[arg(long)]
        defaults: bool,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Create the IAM role and the Redshift cluster
    Iac {
        /// Return as soon as cluster creation is requested
        #[arg(long)]
        no_wait: bool,

        /// Skip opening the database port in the default security group
        #[arg(long)]
        no_ingress: bool,
    },

    /// Drop and recreate the staging and star schema tables
    CreateTables,

    /// Copy the source data into staging and fill the star schema
    Etl {
        /// Load the full dataset without asking
        #[arg(short, long, conflicts_with = "test")]
        yes: bool,

        /// Load the small test subset
        #[arg(short, long)]
        test: bool,
    },

    /// Run the analytic queries
    Analytics {
        /// List the available queries
        #[arg(long, conflicts_with = "query")]
        list: bool,

        /// Run one query by number
        #[arg(short, long)]
        query: Option<usize>,
    },

    /// Show the cluster status
    Status,

    /// Pause an available cluster
    Pause,

    /// Resume a paused cluster
    Resume {
        /// Wait until the cluster is available again
        #[arg(long)]
        wait: bool,
    },

    /// Delete the cluster and the IAM role
    Cleanup,

    /// Show the most recent COPY errors
    LoadErrors {
        /// Number of errors to show
        #[arg(long, default_value = "10")]
        limit: u32,
    },

    /// Browse the source dataset
    Sample {
        #[command(subcommand)]
        target: SampleTarget,
    },

    /// Derive the star schema locally from source files
    Preview {
        /// Log events (s3:// URL, file or directory)
        #[arg(long)]
        events: String,

        /// Song records (s3:// URL, file or directory)
        #[arg(long)]
        songs: String,

        /// Maximum number of objects read per source
        #[arg(long, default_value = "50")]
        max_files: usize,

        /// Rows shown per table
        #[arg(long, default_value = "5")]
        rows: usize,
    },
}

/// What `sample` lists
#[derive(Subcommand, Debug)]
pub enum SampleTarget {
    /// List song files, optionally under a shard prefix such as `A/B/C`
    Songs {
        #[arg(long, default_value = "")]
        prefix: String,

        /// Number of files
        #[arg(short = 'n', long, default_value = "5")]
        limit: usize,
    },

    /// List log files for one month
    Logs {
        #[arg(long, default_value = "2018")]
        year: i32,

        #[arg(long, default_value = "11")]
        month: u32,

        /// Number of files
        #[arg(short = 'n', long, default_value = "5")]
        limit: usize,
    },

    /// Print the JSONPaths document used for the event COPY
    Jsonpath,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sparkify-dwh",
            "analytics",
            "-q",
            "3",
            "-f",
            "json",
            "-C",
            "other.toml",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(
            cli.command,
            Commands::Analytics {
                list: false,
                query: Some(3)
            }
        ));
    }

    #[test]
    fn test_etl_flags_conflict() {
        assert!(Cli::try_parse_from(["sparkify-dwh", "etl", "-y", "-t"]).is_err());
        let cli = Cli::try_parse_from(["sparkify-dwh", "--dry-run", "etl", "-t"]).unwrap();
        assert!(cli.dry_run);
        assert!(matches!(cli.command, Commands::Etl { yes: false, test: true }));
    }

    #[test]
    fn test_sample_logs_defaults() {
        let cli = Cli::try_parse_from(["sparkify-dwh", "sample", "logs"]).unwrap();
        match cli.command {
            Commands::Sample {
                target: SampleTarget::Logs { year, month, limit },
            } => assert_eq!((year, month, limit), (2018, 11, 5)),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
