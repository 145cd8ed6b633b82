//! Infrastructure types
//!
//! Plain descriptions of the role and cluster, independent of the SDK
//! response shapes.

use crate::config::DwhConfig;
use crate::types::{ClusterStatus, ClusterType};
use std::time::Duration;

/// Managed policy granting read access to the source bucket
pub const S3_READ_ONLY_POLICY_ARN: &str = "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess";

/// Description attached to the access role
pub const ROLE_DESCRIPTION: &str = "Allow s3 read-only access for Redshift";

/// Result of a role creation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleOutcome {
    /// The role was created by this call
    Created,
    /// A role with this name already existed
    AlreadyExists,
}

/// Everything needed to request a cluster
#[derive(Clone, PartialEq)]
pub struct ClusterSpec {
    pub identifier: String,
    pub cluster_type: ClusterType,
    pub node_type: String,
    pub num_nodes: u32,
    pub db_name: String,
    pub master_username: String,
    pub master_password: String,
    pub port: u16,
    /// Role ARN attached to the cluster (set once the role exists)
    pub role_arn: String,
}

impl ClusterSpec {
    /// Build a spec from the config (the role ARN is filled in later)
    pub fn from_config(config: &DwhConfig) -> Self {
        Self {
            identifier: config.cluster.identifier.clone(),
            cluster_type: config.cluster.cluster_type,
            node_type: config.cluster.node_type.clone(),
            num_nodes: config.cluster.num_nodes,
            db_name: config.db.name.clone(),
            master_username: config.db.user.clone(),
            master_password: config.db.password.clone(),
            port: config.db.port,
            role_arn: config.iam_role.arn.clone(),
        }
    }

    /// Copy of this spec with the role ARN set
    #[must_use]
    pub fn with_role_arn(&self, arn: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.role_arn = arn.into();
        next
    }

    /// Node count to send (single-node clusters must omit it)
    pub fn requested_nodes(&self) -> Option<u32> {
        match self.cluster_type {
            ClusterType::SingleNode => None,
            ClusterType::MultiNode => Some(self.num_nodes),
        }
    }
}

impl std::fmt::Debug for ClusterSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterSpec")
            .field("identifier", &self.identifier)
            .field("cluster_type", &self.cluster_type)
            .field("node_type", &self.node_type)
            .field("num_nodes", &self.num_nodes)
            .field("db_name", &self.db_name)
            .field("master_username", &self.master_username)
            .field("port", &self.port)
            .field("role_arn", &self.role_arn)
            .finish_non_exhaustive()
    }
}

/// Cluster endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEndpoint {
    pub address: String,
    pub port: u16,
}

/// Cluster description as reported by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterInfo {
    pub identifier: String,
    pub node_type: String,
    pub status: ClusterStatus,
    pub master_username: String,
    pub db_name: String,
    /// Present once the cluster has finished creating
    pub endpoint: Option<ClusterEndpoint>,
    pub num_nodes: Option<u32>,
    pub vpc_id: Option<String>,
}

impl ClusterInfo {
    /// Minimal description with the given status (other fields empty)
    pub fn with_status(identifier: impl Into<String>, status: ClusterStatus) -> Self {
        Self {
            identifier: identifier.into(),
            node_type: String::new(),
            status,
            master_username: String::new(),
            db_name: String::new(),
            endpoint: None,
            num_nodes: None,
            vpc_id: None,
        }
    }

    /// Label/value pairs for the property summary
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let endpoint = self
            .endpoint
            .as_ref()
            .map(|e| format!("{}:{}", e.address, e.port))
            .unwrap_or_default();
        vec![
            ("ClusterIdentifier", self.identifier.clone()),
            ("NodeType", self.node_type.clone()),
            ("ClusterStatus", self.status.to_string()),
            ("MasterUsername", self.master_username.clone()),
            ("DBName", self.db_name.clone()),
            ("Endpoint", endpoint),
            (
                "NumberOfNodes",
                self.num_nodes.map(|n| n.to_string()).unwrap_or_default(),
            ),
            ("VpcId", self.vpc_id.clone().unwrap_or_default()),
        ]
    }
}

/// Fixed-interval polling bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Sleep between polls
    pub interval: Duration,
    /// Polls before giving up
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_attempts: 60, // 30 minutes at 30 second intervals
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }
}

/// Settings the infrastructure manager works from
#[derive(Debug, Clone)]
pub struct InfraSettings {
    /// Access role name
    pub role_name: String,
    /// Policy attached to the access role
    pub policy_arn: String,
    /// Cluster request (role ARN filled in by `create`)
    pub cluster: ClusterSpec,
    /// Status polling bounds
    pub poll: PollConfig,
    /// CIDR allowed to reach the database port
    pub ingress_cidr: String,
}

impl InfraSettings {
    /// Build settings from the warehouse config
    pub fn from_config(config: &DwhConfig) -> Self {
        Self {
            role_name: config.iam_role.name.clone(),
            policy_arn: S3_READ_ONLY_POLICY_ARN.to_string(),
            cluster: ClusterSpec::from_config(config),
            poll: PollConfig::new(config.poll_interval(), config.max_poll_attempts()),
            ingress_cidr: config.ingress_cidr(),
        }
    }

    /// Cluster identifier
    pub fn cluster_id(&self) -> &str {
        &self.cluster.identifier
    }
}

/// Trust policy letting the warehouse service assume the role
pub fn redshift_trust_policy() -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Action": "sts:AssumeRole",
                "Principal": {
                    "Service": "redshift.amazonaws.com"
                }
            }
        ]
    })
    .to_string()
}
