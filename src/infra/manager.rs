//! Cluster lifecycle orchestration

use super::provider::InfraProvider;
use super::types::{redshift_trust_policy, ClusterInfo, InfraSettings, RoleOutcome, ROLE_DESCRIPTION};
use crate::error::{Error, Result};
use crate::types::ClusterStatus;
use std::future::Future;
use tracing::{debug, info, warn};

/// Drives the role and cluster through their lifecycle
pub struct InfraManager<P> {
    pub(super) provider: P,
    settings: InfraSettings,
}

impl<P: InfraProvider> InfraManager<P> {
    /// Create a manager over a provider
    pub fn new(provider: P, settings: InfraSettings) -> Self {
        Self { provider, settings }
    }

    /// Get the settings
    pub fn settings(&self) -> &InfraSettings {
        &self.settings
    }

    /// Create the access role and request the cluster
    ///
    /// An existing role is reused. Returns the role ARN; the cluster is
    /// still creating when this returns.
    pub async fn create(&self) -> Result<String> {
        let role = self.settings.role_name.as_str();

        info!(role, "Creating access role");
        match self
            .provider
            .create_role(role, &redshift_trust_policy(), ROLE_DESCRIPTION)
            .await?
        {
            RoleOutcome::Created => info!(role, "Access role created"),
            RoleOutcome::AlreadyExists => info!(role, "Access role already exists, reusing it"),
        }

        self.provider
            .attach_role_policy(role, &self.settings.policy_arn)
            .await?;
        let arn = self.provider.role_arn(role).await?;
        debug!(arn = %arn, "Resolved role ARN");

        let spec = self.settings.cluster.with_role_arn(&arn);
        info!(
            cluster = %spec.identifier,
            node_type = %spec.node_type,
            cluster_type = %spec.cluster_type,
            "Requesting cluster"
        );
        self.provider.create_cluster(&spec).await?;

        Ok(arn)
    }

    /// Poll until the cluster is available and return its description
    pub async fn wait_until_available(&self) -> Result<ClusterInfo> {
        let id = self.settings.cluster_id();
        info!(cluster = id, "Waiting for cluster to become available");
        self.poll_until(&format!("cluster '{id}' to become available"), || async move {
            match self.provider.describe_cluster(id).await? {
                None => Err(Error::infra(
                    "DescribeClusters",
                    format!("Cluster '{id}' not found"),
                )),
                Some(info) if info.status.is_available() => Ok(Some(info)),
                Some(info) => {
                    debug!(cluster = id, status = %info.status, "Cluster not available yet");
                    Ok(None)
                }
            }
        })
        .await
    }

    /// Current cluster status; `None` if no cluster exists
    pub async fn status(&self) -> Result<Option<ClusterStatus>> {
        Ok(self
            .provider
            .describe_cluster(self.settings.cluster_id())
            .await?
            .map(|info| info.status))
    }

    /// Full cluster description; fails if the cluster does not exist
    pub async fn describe(&self) -> Result<ClusterInfo> {
        let id = self.settings.cluster_id();
        self.provider
            .describe_cluster(id)
            .await?
            .ok_or_else(|| Error::infra("DescribeClusters", format!("Cluster '{id}' not found")))
    }

    /// Pause an available cluster
    pub async fn pause(&self) -> Result<()> {
        let info = self.describe().await?;
        if info.status != ClusterStatus::Available {
            return Err(Error::cluster_state("available", info.status.as_str()));
        }
        info!(cluster = %info.identifier, "Pausing cluster");
        self.provider.pause_cluster(&info.identifier).await
    }

    /// Resume a paused cluster
    pub async fn resume(&self) -> Result<()> {
        let info = self.describe().await?;
        if info.status != ClusterStatus::Paused {
            return Err(Error::cluster_state("paused", info.status.as_str()));
        }
        info!(cluster = %info.identifier, "Resuming cluster");
        self.provider.resume_cluster(&info.identifier).await
    }

    /// Delete the cluster and the access role, waiting for each to go
    ///
    /// Safe to repeat: pieces that are already gone are skipped.
    pub async fn destroy(&self) -> Result<()> {
        let id = self.settings.cluster_id();
        match self.provider.describe_cluster(id).await? {
            Some(info) => {
                if info.status == ClusterStatus::Deleting {
                    info!(cluster = id, "Cluster already deleting");
                } else {
                    info!(cluster = id, status = %info.status, "Deleting cluster");
                    self.provider.delete_cluster(id).await?;
                }
                self.poll_until(&format!("cluster '{id}' to be deleted"), || async move {
                    Ok(self
                        .provider
                        .describe_cluster(id)
                        .await?
                        .is_none()
                        .then_some(()))
                })
                .await?;
                info!(cluster = id, "Cluster deleted");
            }
            None => info!(cluster = id, "No cluster to delete"),
        }

        let role = self.settings.role_name.as_str();
        let policy = self.settings.policy_arn.as_str();
        if self.provider.detach_role_policy(role, policy).await? {
            info!(role, "Detaching access policy");
            self.poll_until(&format!("policy to detach from '{role}'"), || async move {
                let attached = self.provider.attached_role_policies(role).await?;
                Ok((!attached.iter().any(|p| p == policy)).then_some(()))
            })
            .await?;
        }

        if self.provider.delete_role(role).await? {
            info!(role, "Access role deleted");
        } else {
            info!(role, "No access role to delete");
        }
        Ok(())
    }

    /// Open the database port to the configured CIDR
    ///
    /// An existing identical rule is not an error.
    pub async fn open_port(&self, info: &ClusterInfo) -> Result<()> {
        let vpc_id = info.vpc_id.as_deref().ok_or_else(|| {
            Error::infra(
                "AuthorizeSecurityGroupIngress",
                format!("Cluster '{}' has no VPC", info.identifier),
            )
        })?;
        let port = info
            .endpoint
            .as_ref()
            .map_or(self.settings.cluster.port, |e| e.port);
        let cidr = self.settings.ingress_cidr.as_str();

        if self.provider.authorize_ingress(vpc_id, port, cidr).await? {
            info!(vpc_id, port, cidr, "Opened database port");
        } else {
            warn!(vpc_id, port, cidr, "Ingress rule already exists");
        }
        Ok(())
    }

    /// Run `check` at the poll interval until it yields a value
    async fn poll_until<T, F, Fut>(&self, what: &str, mut check: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let poll = self.settings.poll;
        for attempt in 1..=poll.max_attempts {
            if let Some(value) = check().await? {
                return Ok(value);
            }
            debug!(attempt, max_attempts = poll.max_attempts, "Waiting for {what}");
            if attempt < poll.max_attempts {
                tokio::time::sleep(poll.interval).await;
            }
        }
        Err(Error::timeout(what, poll.max_attempts))
    }
}
