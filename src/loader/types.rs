//! Loader types

use crate::config::DwhConfig;
use crate::error::Result;
use crate::types::EtlMode;

/// Where the staging COPY statements read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySources {
    /// Event log prefix or object
    pub log_data: String,
    /// JSONPaths file mapping log fields to columns
    pub log_jsonpath: String,
    /// Song metadata prefix
    pub song_data: String,
    /// Role the cluster assumes to read the bucket
    pub role_arn: String,
    /// Bucket region
    pub region: String,
}

impl CopySources {
    /// Sources for a load mode; requires a recorded role ARN
    pub fn from_config(config: &DwhConfig, mode: EtlMode) -> Result<Self> {
        Ok(Self {
            log_data: config.log_data(mode),
            log_jsonpath: config.s3.log_jsonpath.clone(),
            song_data: config.song_data(mode),
            role_arn: config.role_arn()?.to_string(),
            region: config.s3_region().to_string(),
        })
    }
}

/// Statistics from a load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Staging tables copied
    pub tables_staged: usize,
    /// Rows affected per insert step, in execution order
    pub inserted: Vec<(String, u64)>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl LoadStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an insert step
    pub fn add_insert(&mut self, table: &str, rows: u64) {
        self.inserted.push((table.to_string(), rows));
    }

    /// Total rows inserted into `table` (delete steps are not counted)
    pub fn rows_for(&self, table: &str) -> u64 {
        self.inserted
            .iter()
            .filter(|(t, _)| t == table)
            .map(|(_, rows)| rows)
            .sum()
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
