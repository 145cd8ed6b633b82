//! Object storage access for the source dataset

use super::types::ObjectInfo;
use crate::credentials::AccessKey;
use crate::error::{Error, Result, ResultExt};
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use url::Url;

/// Song files are sharded by the first three letters of the track id
static SONG_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(([A-Z]/){0,2}[A-Z])?$").unwrap());

/// Check a song shard prefix such as `A`, `A/B` or `A/B/C`
pub fn validate_song_prefix(prefix: &str) -> Result<()> {
    if SONG_PREFIX_REGEX.is_match(prefix) {
        Ok(())
    } else {
        Err(Error::config(format!(
            "Invalid song prefix '{prefix}': use up to three capital letters separated by '/', e.g. 'A/B/C'"
        )))
    }
}

/// Split `s3://bucket/key/prefix` into bucket and key
pub fn split_s3_url(location: &str) -> Result<(String, String)> {
    let invalid = || Error::config(format!("Invalid S3 URL: {location}"));
    let url = Url::parse(location).map_err(|_| invalid())?;
    if url.scheme() != "s3" {
        return Err(invalid());
    }
    let bucket = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(invalid)?;
    let key = url.path().trim_matches('/');
    Ok((bucket.to_string(), key.to_string()))
}

/// Join key segments, ignoring empty ones
fn join_key(base: &str, rest: &str) -> String {
    match (base.trim_matches('/'), rest.trim_matches('/')) {
        ("", rest) => rest.to_string(),
        (base, "") => base.to_string(),
        (base, rest) => format!("{base}/{rest}"),
    }
}

/// Read-only view of the bucket holding the song and log data
#[derive(Debug, Clone)]
pub struct SourceBucket {
    store: Arc<dyn ObjectStore>,
    /// `s3://bucket` or the local directory (for display)
    location: String,
}

impl SourceBucket {
    /// Open an S3 bucket, signing with the given key when present
    pub fn s3(bucket: &str, region: &str, credentials: Option<&AccessKey>) -> Result<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(region);
        if let Some(creds) = credentials {
            builder = builder
                .with_access_key_id(&creds.key)
                .with_secret_access_key(&creds.secret);
        }
        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create S3 client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            location: format!("s3://{bucket}"),
        })
    }

    /// Open a local directory laid out like the bucket
    pub fn local(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let store = LocalFileSystem::new_with_prefix(dir).map_err(|e| {
            Error::config(format!(
                "Failed to open local dataset at {}: {e}",
                dir.display()
            ))
        })?;
        Ok(Self {
            store: Arc::new(store),
            location: dir.display().to_string(),
        })
    }

    /// Open whatever `location` names, returning the bucket and the key
    /// within it
    ///
    /// `s3://bucket/key` opens the bucket. A local file opens its parent
    /// directory; a local directory opens itself with an empty key.
    pub fn open(
        location: &str,
        region: &str,
        credentials: Option<&AccessKey>,
    ) -> Result<(Self, String)> {
        if location.starts_with("s3://") {
            let (bucket, key) = split_s3_url(location)?;
            return Ok((Self::s3(&bucket, region, credentials)?, key));
        }

        let path = Path::new(location.strip_prefix("file://").unwrap_or(location));
        if path.is_file() {
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            Ok((Self::local(parent)?, name))
        } else if path.is_dir() {
            Ok((Self::local(path)?, String::new()))
        } else {
            Err(Error::FileNotFound {
                path: location.to_string(),
            })
        }
    }

    /// Where this bucket points
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Objects under `prefix`, sorted by key, at most `limit`
    pub async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<ObjectInfo>> {
        let prefix_path = ObjectPath::from(prefix);
        let prefix_arg = if prefix.is_empty() {
            None
        } else {
            Some(&prefix_path)
        };

        let mut objects: Vec<ObjectInfo> = self
            .store
            .list(prefix_arg)
            .map_ok(|meta| ObjectInfo {
                key: meta.location.to_string(),
                size: meta.size as u64,
                last_modified: meta.last_modified,
            })
            .try_collect()
            .await?;
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        objects.truncate(limit);

        tracing::debug!(
            location = %self.location,
            prefix,
            count = objects.len(),
            "Listed objects"
        );
        Ok(objects)
    }

    /// Song files under `song_root`, optionally narrowed to a shard prefix
    pub async fn song_objects(
        &self,
        song_root: &str,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<ObjectInfo>> {
        validate_song_prefix(prefix)?;
        self.list(&join_key(song_root, prefix), limit).await
    }

    /// Log files for one month under `log_root`
    pub async fn log_objects(
        &self,
        log_root: &str,
        year: i32,
        month: u32,
        limit: usize,
    ) -> Result<Vec<ObjectInfo>> {
        if !(1..=12).contains(&month) {
            return Err(Error::invalid_value(
                "month",
                format!("{month} is not between 1 and 12"),
            ));
        }
        self.list(&join_key(log_root, &format!("{year}/{month:02}")), limit)
            .await
    }

    /// Raw bytes of one object
    pub async fn read(&self, key: &str) -> Result<bytes::Bytes> {
        let path = ObjectPath::from(key);
        let object = self
            .store
            .get(&path)
            .await
            .with_context(|| format!("Reading {}/{key}", self.location))?;
        Ok(object.bytes().await?)
    }

    /// Whether `key` names a single object
    pub async fn is_object(&self, key: &str) -> bool {
        !key.is_empty() && self.store.head(&ObjectPath::from(key)).await.is_ok()
    }

    /// Parse a newline-delimited JSON object
    pub async fn read_records<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let bytes = self.read(key).await?;
        parse_records(key, &bytes)
    }

    /// Parse every JSON object under `key` (or `key` itself when it is one
    /// object), reading at most `limit` objects
    pub async fn read_all_records<T: DeserializeOwned>(
        &self,
        key: &str,
        limit: usize,
    ) -> Result<Vec<T>> {
        if self.is_object(key).await {
            return self.read_records(key).await;
        }
        let mut records = Vec::new();
        for object in self.list(key, limit).await? {
            if object.key.ends_with(".json") {
                records.extend(self.read_records::<T>(&object.key).await?);
            }
        }
        Ok(records)
    }

    /// Parse one JSON document
    pub async fn read_json(&self, key: &str) -> Result<serde_json::Value> {
        let bytes = self.read(key).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Parse newline-delimited JSON, skipping blank lines
///
/// A malformed line is reported as a load error naming the object and the
/// 1-based line number.
pub fn parse_records<T: DeserializeOwned>(source: &str, bytes: &[u8]) -> Result<Vec<T>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::load(source, format!("not UTF-8: {e}")))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| Error::load(source, format!("line {}: {e}", i + 1)))
        })
        .collect()
}
