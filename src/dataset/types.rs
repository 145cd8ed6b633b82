//! Dataset types

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A listed object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectInfo {
    /// Key within the bucket
    pub key: String,
    /// Size in bytes
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}
