//! Warehouse configuration file
//!
//! The whole workflow is driven by one sectioned TOML file (`dwh.toml` by
//! default). Each CLI stage reads it, and the provisioning stage writes back
//! the two values only known after resources exist: the role ARN and the
//! cluster endpoint host.
//!
//! ```toml
//! [aws]
//! key = "AKIA..."
//! secret = "..."
//! region = "us-west-2"
//!
//! [cluster]
//! identifier = "sparkify-cluster"
//! cluster_type = "multi-node"
//! node_type = "dc2.large"
//! num_nodes = 4
//!
//! [db]
//! name = "dwh"
//! user = "sparkifier"
//! password = "Passw0rd"
//! port = 5439
//!
//! [iam_role]
//! name = "sparkify_redshift_role"
//!
//! [s3]
//! log_data = "s3://udacity-dend/log-data"
//! log_jsonpath = "s3://udacity-dend/log_json_path.json"
//! song_data = "s3://udacity-dend/song-data"
//! ```

use crate::credentials::AccessKey;
use crate::error::{Error, Result};
use crate::types::{ClusterType, EtlMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file name
pub const DEFAULT_CONFIG_PATH: &str = "dwh.toml";

/// Relative path of the single day of logs used by test loads
pub const TEST_LOG_SUFFIX: &str = "2018/11/2018-11-01-events.json";

/// Song prefix used by test loads
pub const TEST_SONG_SUFFIX: &str = "A/A/A";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete warehouse configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DwhConfig {
    /// Admin credentials and region
    pub aws: AwsConfig,

    /// Cluster parameters
    pub cluster: ClusterConfig,

    /// Database connection
    pub db: DbConfig,

    /// Access role assumed by the cluster
    pub iam_role: IamRoleConfig,

    /// Source data locations
    pub s3: S3Config,
}

// ============================================================================
// Sections
// ============================================================================

/// `[aws]` section
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AwsConfig {
    pub key: String,
    pub secret: String,
    pub region: String,
}

impl std::fmt::Debug for AwsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsConfig")
            .field("key", &self.key)
            .field("secret", &"****")
            .field("region", &self.region)
            .finish()
    }
}

/// `[cluster]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Cluster identifier (unique per account and region)
    pub identifier: String,

    /// Single- or multi-node topology
    pub cluster_type: ClusterType,

    /// Node type (e.g., "dc2.large")
    pub node_type: String,

    /// Number of compute nodes (ignored for single-node clusters)
    pub num_nodes: u32,

    /// Seconds between status polls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,

    /// Polls before giving up on a state transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_poll_attempts: Option<u32>,

    /// CIDR allowed to reach the database port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_cidr: Option<String>,
}

fn default_poll_interval() -> u64 {
    30
}

fn default_max_poll() -> u32 {
    60
}

fn default_ingress_cidr() -> String {
    "0.0.0.0/0".to_string()
}

/// `[db]` section
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct DbConfig {
    /// Cluster endpoint address (empty until provisioned)
    #[serde(default)]
    pub host: String,
    pub name: String,
    pub user: String,
    pub password: String,
    pub port: u16,
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"****")
            .field("port", &self.port)
            .finish()
    }
}

/// `[iam_role]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IamRoleConfig {
    pub name: String,

    /// Role ARN (empty until provisioned)
    #[serde(default)]
    pub arn: String,
}

/// `[s3]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Config {
    /// Prefix holding the event log files
    pub log_data: String,

    /// JSONPaths file mapping log fields to staging columns
    pub log_jsonpath: String,

    /// Prefix holding the song files
    pub song_data: String,

    /// Region of the source bucket (defaults to `aws.region`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Log path used by test loads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_log_data: Option<String>,

    /// Song path used by test loads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_song_data: Option<String>,
}

// ============================================================================
// Generation
// ============================================================================

/// Overrides collected when generating a config file
///
/// Every `None` falls back to the project default.
#[derive(Debug, Clone, Default)]
pub struct ConfigAnswers {
    pub region: Option<String>,
    pub cluster_identifier: Option<String>,
    pub db_name: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub role_name: Option<String>,
}

impl DwhConfig {
    /// Build a new config from an access key and optional overrides
    pub fn generate(credentials: &AccessKey, answers: &ConfigAnswers) -> Self {
        let pick = |value: &Option<String>, default: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        };

        Self {
            aws: AwsConfig {
                key: credentials.key.clone(),
                secret: credentials.secret.clone(),
                region: pick(&answers.region, "us-west-2"),
            },
            cluster: ClusterConfig {
                identifier: pick(&answers.cluster_identifier, "sparkify-cluster"),
                cluster_type: ClusterType::MultiNode,
                node_type: "dc2.large".to_string(),
                num_nodes: 4,
                poll_interval_secs: Some(default_poll_interval()),
                max_poll_attempts: Some(default_max_poll()),
                ingress_cidr: Some(default_ingress_cidr()),
            },
            db: DbConfig {
                host: String::new(),
                name: pick(&answers.db_name, "dwh"),
                user: pick(&answers.db_user, "sparkifier"),
                password: pick(&answers.db_password, "Passw0rd"),
                port: 5439,
            },
            iam_role: IamRoleConfig {
                name: pick(&answers.role_name, "sparkify_redshift_role"),
                arn: String::new(),
            },
            s3: S3Config {
                log_data: "s3://udacity-dend/log-data".to_string(),
                log_jsonpath: "s3://udacity-dend/log_json_path.json".to_string(),
                song_data: "s3://udacity-dend/song-data".to_string(),
                region: Some("us-west-2".to_string()),
                test_log_data: None,
                test_song_data: None,
            },
        }
    }
}

// ============================================================================
// Loading and Saving
// ============================================================================

impl DwhConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::config(format!("Invalid config file: {}", e.message())))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config to `path` (temp file + rename)
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let temp_path: PathBuf = path.with_extension("tmp");
        std::fs::write(&temp_path, contents)?;
        std::fs::rename(&temp_path, path)?;

        tracing::debug!(path = %path.display(), "Config written");
        Ok(())
    }

    /// Check values that parse but cannot be used
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("aws.key", &self.aws.key),
            ("aws.secret", &self.aws.secret),
            ("aws.region", &self.aws.region),
            ("cluster.identifier", &self.cluster.identifier),
            ("cluster.node_type", &self.cluster.node_type),
            ("db.name", &self.db.name),
            ("db.user", &self.db.user),
            ("db.password", &self.db.password),
            ("iam_role.name", &self.iam_role.name),
            ("s3.log_data", &self.s3.log_data),
            ("s3.log_jsonpath", &self.s3.log_jsonpath),
            ("s3.song_data", &self.s3.song_data),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::invalid_value(field, "must not be empty"));
            }
        }

        if self.cluster.num_nodes == 0 {
            return Err(Error::invalid_value(
                "cluster.num_nodes",
                "must be at least 1",
            ));
        }
        if self.db.port == 0 {
            return Err(Error::invalid_value("db.port", "must be between 1 and 65535"));
        }
        if self.cluster.max_poll_attempts == Some(0) {
            return Err(Error::invalid_value(
                "cluster.max_poll_attempts",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl DwhConfig {
    /// Role ARN recorded at provisioning time
    pub fn role_arn(&self) -> Result<&str> {
        non_empty(&self.iam_role.arn, "iam_role.arn")
    }

    /// Cluster endpoint recorded at provisioning time
    pub fn db_host(&self) -> Result<&str> {
        non_empty(&self.db.host, "db.host")
    }

    /// Region of the source bucket
    pub fn s3_region(&self) -> &str {
        self.s3.region.as_deref().unwrap_or(&self.aws.region)
    }

    /// Interval between cluster status polls
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.cluster
                .poll_interval_secs
                .unwrap_or_else(default_poll_interval),
        )
    }

    /// Maximum number of status polls per transition
    pub fn max_poll_attempts(&self) -> u32 {
        self.cluster
            .max_poll_attempts
            .unwrap_or_else(default_max_poll)
    }

    /// CIDR allowed to reach the database port
    pub fn ingress_cidr(&self) -> String {
        self.cluster
            .ingress_cidr
            .clone()
            .unwrap_or_else(default_ingress_cidr)
    }

    /// Log source path for a load mode
    pub fn log_data(&self, mode: EtlMode) -> String {
        match mode {
            EtlMode::Full => self.s3.log_data.clone(),
            EtlMode::Test => self.s3.test_log_data.clone().unwrap_or_else(|| {
                format!("{}/{TEST_LOG_SUFFIX}", self.s3.log_data.trim_end_matches('/'))
            }),
        }
    }

    /// Song source path for a load mode
    pub fn song_data(&self, mode: EtlMode) -> String {
        match mode {
            EtlMode::Full => self.s3.song_data.clone(),
            EtlMode::Test => self.s3.test_song_data.clone().unwrap_or_else(|| {
                format!("{}/{TEST_SONG_SUFFIX}", self.s3.song_data.trim_end_matches('/'))
            }),
        }
    }

    /// Copy of this config with the role ARN recorded
    #[must_use]
    pub fn with_role_arn(&self, arn: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.iam_role.arn = arn.into();
        next
    }

    /// Copy of this config with the cluster endpoint recorded
    #[must_use]
    pub fn with_host(&self, host: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.db.host = host.into();
        next
    }

    /// Copy of this config with provisioning-time values cleared
    #[must_use]
    pub fn cleared_provisioning(&self) -> Self {
        self.with_role_arn("").with_host("")
    }
}

fn non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    if value.trim().is_empty() {
        Err(Error::missing_field(field))
    } else {
        Ok(value)
    }
}
