//! Infrastructure module
//!
//! Provisions and tears down the access role and the warehouse cluster.
//!
//! # Overview
//!
//! The infra module provides:
//! - `InfraProvider` - The remote calls everything else is built on
//! - `AwsProvider` - IAM, Redshift and EC2 implementation
//! - `InfraManager` - Create, wait, pause, resume, destroy and open the port
//!
//! # Example
//!
//! ```ignore
//! use sparkify_dwh::infra::{AwsProvider, InfraManager, InfraSettings};
//!
//! let provider = AwsProvider::from_config(&config).await;
//! let manager = InfraManager::new(provider, InfraSettings::from_config(&config));
//! let role_arn = manager.create().await?;
//! let cluster = manager.wait_until_available().await?;
//! manager.open_port(&cluster).await?;
//! ```

mod aws;
mod manager;
mod provider;
mod types;

pub use aws::AwsProvider;
pub use manager::InfraManager;
pub use provider::InfraProvider;
pub use types::{
    redshift_trust_policy, ClusterEndpoint, ClusterInfo, ClusterSpec, InfraSettings, PollConfig,
    RoleOutcome, ROLE_DESCRIPTION, S3_READ_ONLY_POLICY_ARN,
};
