//! Provider trait for infrastructure calls

use super::types::{ClusterInfo, ClusterSpec, RoleOutcome};
use crate::error::Result;
use async_trait::async_trait;

/// Remote calls the infrastructure manager is built on
///
/// Every method is a single request to the cloud provider. Nothing is
/// cached; state is only observable through `describe_cluster`.
#[async_trait]
pub trait InfraProvider: Send + Sync {
    /// Create a role with the given trust policy
    async fn create_role(
        &self,
        name: &str,
        trust_policy: &str,
        description: &str,
    ) -> Result<RoleOutcome>;

    /// ARN of an existing role
    async fn role_arn(&self, name: &str) -> Result<String>;

    /// Attach a managed policy to a role
    async fn attach_role_policy(&self, role: &str, policy_arn: &str) -> Result<()>;

    /// Detach a managed policy; `false` if it was not attached
    async fn detach_role_policy(&self, role: &str, policy_arn: &str) -> Result<bool>;

    /// ARNs of the policies attached to a role (empty if the role is gone)
    async fn attached_role_policies(&self, role: &str) -> Result<Vec<String>>;

    /// Delete a role; `false` if it did not exist
    async fn delete_role(&self, name: &str) -> Result<bool>;

    /// Request a new cluster (returns before the cluster is usable)
    async fn create_cluster(&self, spec: &ClusterSpec) -> Result<()>;

    /// Describe a cluster; `None` if it does not exist
    async fn describe_cluster(&self, identifier: &str) -> Result<Option<ClusterInfo>>;

    /// Pause an available cluster
    async fn pause_cluster(&self, identifier: &str) -> Result<()>;

    /// Resume a paused cluster
    async fn resume_cluster(&self, identifier: &str) -> Result<()>;

    /// Delete a cluster without a final snapshot
    async fn delete_cluster(&self, identifier: &str) -> Result<()>;

    /// Allow TCP traffic on `port` from `cidr` in the VPC's default
    /// security group; `false` if the rule already existed
    async fn authorize_ingress(&self, vpc_id: &str, port: u16, cidr: &str) -> Result<bool>;
}
