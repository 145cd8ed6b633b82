//! AWS implementation of the infrastructure provider
//!
//! Talks to IAM, Redshift and EC2 using the access key from the config
//! rather than the ambient credential chain.

use super::provider::InfraProvider;
use super::types::{ClusterEndpoint, ClusterInfo, ClusterSpec, RoleOutcome};
use crate::config::DwhConfig;
use crate::error::{Error, Result};
use crate::types::ClusterStatus;
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_redshift::types::Cluster;

/// Error code EC2 returns when an ingress rule already exists
const DUPLICATE_PERMISSION: &str = "InvalidPermission.Duplicate";

/// Provider backed by the AWS SDK
#[derive(Debug, Clone)]
pub struct AwsProvider {
    iam: aws_sdk_iam::Client,
    redshift: aws_sdk_redshift::Client,
    ec2: aws_sdk_ec2::Client,
}

impl AwsProvider {
    /// Build clients for the configured region and access key
    pub async fn from_config(config: &DwhConfig) -> Self {
        let credentials = Credentials::new(
            config.aws.key.clone(),
            config.aws.secret.clone(),
            None,
            None,
            "dwh-config",
        );
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_redshift::config::Region::new(
                config.aws.region.clone(),
            ))
            .credentials_provider(credentials)
            .load()
            .await;

        tracing::debug!(region = %config.aws.region, "AWS clients initialized");
        Self {
            iam: aws_sdk_iam::Client::new(&sdk_config),
            redshift: aws_sdk_redshift::Client::new(&sdk_config),
            ec2: aws_sdk_ec2::Client::new(&sdk_config),
        }
    }
}

/// Provider error text: service code and message when present
fn sdk_message<E>(err: &E) -> String
where
    E: ProvideErrorMetadata + std::error::Error,
{
    match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        _ => DisplayErrorContext(err).to_string(),
    }
}

fn cluster_info(cluster: &Cluster) -> ClusterInfo {
    ClusterInfo {
        identifier: cluster.cluster_identifier().unwrap_or_default().to_string(),
        node_type: cluster.node_type().unwrap_or_default().to_string(),
        status: ClusterStatus::from(cluster.cluster_status().unwrap_or("unknown")),
        master_username: cluster.master_username().unwrap_or_default().to_string(),
        db_name: cluster.db_name().unwrap_or_default().to_string(),
        endpoint: cluster.endpoint().and_then(|e| {
            Some(ClusterEndpoint {
                address: e.address()?.to_string(),
                port: e.port().and_then(|p| u16::try_from(p).ok())?,
            })
        }),
        num_nodes: cluster
            .number_of_nodes()
            .and_then(|n| u32::try_from(n).ok()),
        vpc_id: cluster.vpc_id().map(str::to_string),
    }
}

#[async_trait]
impl InfraProvider for AwsProvider {
    async fn create_role(
        &self,
        name: &str,
        trust_policy: &str,
        description: &str,
    ) -> Result<RoleOutcome> {
        match self
            .iam
            .create_role()
            .path("/")
            .role_name(name)
            .description(description)
            .assume_role_policy_document(trust_policy)
            .send()
            .await
        {
            Ok(_) => Ok(RoleOutcome::Created),
            Err(sdk_err) => {
                if sdk_err
                    .as_service_error()
                    .is_some_and(|e| e.is_entity_already_exists_exception())
                {
                    return Ok(RoleOutcome::AlreadyExists);
                }
                Err(Error::infra("CreateRole", sdk_message(&sdk_err)))
            }
        }
    }

    async fn role_arn(&self, name: &str) -> Result<String> {
        let output = self
            .iam
            .get_role()
            .role_name(name)
            .send()
            .await
            .map_err(|e| Error::infra("GetRole", sdk_message(&e)))?;
        output
            .role()
            .map(|role| role.arn().to_string())
            .ok_or_else(|| Error::infra("GetRole", format!("Role '{name}' has no ARN")))
    }

    async fn attach_role_policy(&self, role: &str, policy_arn: &str) -> Result<()> {
        self.iam
            .attach_role_policy()
            .role_name(role)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| Error::infra("AttachRolePolicy", sdk_message(&e)))?;
        Ok(())
    }

    async fn detach_role_policy(&self, role: &str, policy_arn: &str) -> Result<bool> {
        match self
            .iam
            .detach_role_policy()
            .role_name(role)
            .policy_arn(policy_arn)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(sdk_err) => {
                if sdk_err
                    .as_service_error()
                    .is_some_and(|e| e.is_no_such_entity_exception())
                {
                    return Ok(false);
                }
                Err(Error::infra("DetachRolePolicy", sdk_message(&sdk_err)))
            }
        }
    }

    async fn attached_role_policies(&self, role: &str) -> Result<Vec<String>> {
        match self
            .iam
            .list_attached_role_policies()
            .role_name(role)
            .send()
            .await
        {
            Ok(output) => Ok(output
                .attached_policies()
                .iter()
                .filter_map(|p| p.policy_arn().map(str::to_string))
                .collect()),
            Err(sdk_err) => {
                if sdk_err
                    .as_service_error()
                    .is_some_and(|e| e.is_no_such_entity_exception())
                {
                    return Ok(Vec::new());
                }
                Err(Error::infra("ListAttachedRolePolicies", sdk_message(&sdk_err)))
            }
        }
    }

    async fn delete_role(&self, name: &str) -> Result<bool> {
        match self.iam.delete_role().role_name(name).send().await {
            Ok(_) => Ok(true),
            Err(sdk_err) => {
                if sdk_err
                    .as_service_error()
                    .is_some_and(|e| e.is_no_such_entity_exception())
                {
                    return Ok(false);
                }
                Err(Error::infra("DeleteRole", sdk_message(&sdk_err)))
            }
        }
    }

    async fn create_cluster(&self, spec: &ClusterSpec) -> Result<()> {
        let mut req = self
            .redshift
            .create_cluster()
            .cluster_identifier(&spec.identifier)
            .cluster_type(spec.cluster_type.as_str())
            .node_type(&spec.node_type)
            .db_name(&spec.db_name)
            .master_username(&spec.master_username)
            .master_user_password(&spec.master_password)
            .port(i32::from(spec.port))
            .iam_roles(&spec.role_arn);
        if let Some(nodes) = spec.requested_nodes() {
            let nodes = i32::try_from(nodes)
                .map_err(|_| Error::invalid_value("cluster.num_nodes", "too large"))?;
            req = req.number_of_nodes(nodes);
        }
        req.send()
            .await
            .map_err(|e| Error::infra("CreateCluster", sdk_message(&e)))?;
        Ok(())
    }

    async fn describe_cluster(&self, identifier: &str) -> Result<Option<ClusterInfo>> {
        match self
            .redshift
            .describe_clusters()
            .cluster_identifier(identifier)
            .send()
            .await
        {
            Ok(output) => Ok(output.clusters().first().map(cluster_info)),
            Err(sdk_err) => {
                if sdk_err
                    .as_service_error()
                    .is_some_and(|e| e.is_cluster_not_found_fault())
                {
                    return Ok(None);
                }
                Err(Error::infra("DescribeClusters", sdk_message(&sdk_err)))
            }
        }
    }

    async fn pause_cluster(&self, identifier: &str) -> Result<()> {
        self.redshift
            .pause_cluster()
            .cluster_identifier(identifier)
            .send()
            .await
            .map_err(|e| Error::infra("PauseCluster", sdk_message(&e)))?;
        Ok(())
    }

    async fn resume_cluster(&self, identifier: &str) -> Result<()> {
        self.redshift
            .resume_cluster()
            .cluster_identifier(identifier)
            .send()
            .await
            .map_err(|e| Error::infra("ResumeCluster", sdk_message(&e)))?;
        Ok(())
    }

    async fn delete_cluster(&self, identifier: &str) -> Result<()> {
        self.redshift
            .delete_cluster()
            .cluster_identifier(identifier)
            .skip_final_cluster_snapshot(true)
            .send()
            .await
            .map_err(|e| Error::infra("DeleteCluster", sdk_message(&e)))?;
        Ok(())
    }

    async fn authorize_ingress(&self, vpc_id: &str, port: u16, cidr: &str) -> Result<bool> {
        let groups = self
            .ec2
            .describe_security_groups()
            .filters(
                aws_sdk_ec2::types::Filter::builder()
                    .name("vpc-id")
                    .values(vpc_id)
                    .build(),
            )
            .filters(
                aws_sdk_ec2::types::Filter::builder()
                    .name("group-name")
                    .values("default")
                    .build(),
            )
            .send()
            .await
            .map_err(|e| Error::infra("DescribeSecurityGroups", sdk_message(&e)))?;

        let group_id = groups
            .security_groups()
            .iter()
            .find_map(|g| g.group_id())
            .ok_or_else(|| {
                Error::infra(
                    "DescribeSecurityGroups",
                    format!("No default security group in VPC '{vpc_id}'"),
                )
            })?;
        tracing::debug!(group_id, vpc_id, "Found default security group");

        match self
            .ec2
            .authorize_security_group_ingress()
            .group_id(group_id)
            .ip_protocol("tcp")
            .cidr_ip(cidr)
            .from_port(i32::from(port))
            .to_port(i32::from(port))
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(sdk_err) if sdk_err.code() == Some(DUPLICATE_PERMISSION) => Ok(false),
            Err(sdk_err) => Err(Error::infra(
                "AuthorizeSecurityGroupIngress",
                sdk_message(&sdk_err),
            )),
        }
    }
}
