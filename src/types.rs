//! Common types used throughout sparkify-dwh
//!
//! This module contains shared type definitions used across multiple
//! modules: cluster states, subscription levels and load modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Cluster Status
// ============================================================================

/// Lifecycle status of the warehouse cluster as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterStatus {
    Available,
    Creating,
    Deleting,
    Modifying,
    Paused,
    Pausing,
    Rebooting,
    Resuming,
    /// Any status string this crate does not act on
    Other(String),
}

impl ClusterStatus {
    /// The provider's wire name for this status
    pub fn as_str(&self) -> &str {
        match self {
            Self::Available => "available",
            Self::Creating => "creating",
            Self::Deleting => "deleting",
            Self::Modifying => "modifying",
            Self::Paused => "paused",
            Self::Pausing => "pausing",
            Self::Rebooting => "rebooting",
            Self::Resuming => "resuming",
            Self::Other(s) => s,
        }
    }

    /// Check if the cluster accepts connections
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl From<&str> for ClusterStatus {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "available" => Self::Available,
            "creating" => Self::Creating,
            "deleting" => Self::Deleting,
            "modifying" => Self::Modifying,
            "paused" => Self::Paused,
            "pausing" => Self::Pausing,
            "rebooting" => Self::Rebooting,
            "resuming" => Self::Resuming,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Cluster Type
// ============================================================================

/// Redshift cluster topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterType {
    SingleNode,
    #[default]
    MultiNode,
}

impl ClusterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleNode => "single-node",
            Self::MultiNode => "multi-node",
        }
    }
}

impl fmt::Display for ClusterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Subscription Level
// ============================================================================

/// User subscription level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Free,
    Paid,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "free" => Ok(Self::Free),
            "paid" => Ok(Self::Paid),
            other => Err(format!("unknown level '{other}'")),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ETL Mode
// ============================================================================

/// Which slice of the source data a load covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EtlMode {
    /// Every object under the configured prefixes
    #[default]
    Full,
    /// The small test subset (one day of logs, one song prefix)
    Test,
}

impl fmt::Display for EtlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("all data"),
            Self::Test => f.write_str("test data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("available", ClusterStatus::Available)]
    #[test_case("paused", ClusterStatus::Paused)]
    #[test_case("Creating", ClusterStatus::Creating)]
    #[test_case("final-snapshot", ClusterStatus::Other("final-snapshot".to_string()))]
    fn test_cluster_status_from_str(input: &str, expected: ClusterStatus) {
        assert_eq!(ClusterStatus::from(input), expected);
    }

    #[test]
    fn test_cluster_status_display_round_trips_unknown() {
        let status = ClusterStatus::from("incompatible-network");
        assert_eq!(status.to_string(), "incompatible-network");
        assert!(!status.is_available());
        assert!(ClusterStatus::Available.is_available());
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("free".parse::<Level>().unwrap(), Level::Free);
        assert_eq!("paid".parse::<Level>().unwrap(), Level::Paid);
        assert!("gold".parse::<Level>().is_err());
    }

    #[test]
    fn test_cluster_type_serde() {
        let t: ClusterType = serde_json::from_str("\"single-node\"").unwrap();
        assert_eq!(t, ClusterType::SingleNode);
        assert_eq!(
            serde_json::to_string(&ClusterType::MultiNode).unwrap(),
            "\"multi-node\""
        );
    }
}
