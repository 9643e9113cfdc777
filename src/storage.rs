//! The storage capability the snapshot workflow runs against.
use async_trait::async_trait;
use std::path::Path;

/// An object as reported back by the storage after an upload or a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub bucket: String,
    pub key: String,
    pub e_tag: Option<String>,
    pub version_id: Option<String>,
}
impl RemoteObject {
    pub fn new(bucket: &str, key: &str) -> Self {
        Self {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            e_tag: None,
            version_id: None,
        }
    }
    /// Identifier of the stored object: the version id when the bucket is versioned, otherwise
    /// the e-tag.
    pub fn id(&self) -> Option<&str> {
        self.version_id.as_deref().or(self.e_tag.as_deref())
    }
}

/// Upload and copy of single objects. Chunking, retries and checksums are up to the
/// implementation.
#[async_trait]
pub trait Storage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Upload the file at `local_path` to `bucket` under `remote_key`.
    async fn upload(
        &self,
        bucket: &str,
        local_path: &Path,
        remote_key: &str,
    ) -> Result<RemoteObject, Self::Error>;

    /// Server-side copy of `source_bucket/source_key` (in `source_region`) to
    /// `dest_bucket/dest_key`.
    async fn copy(
        &self,
        dest_bucket: &str,
        dest_key: &str,
        source_bucket: &str,
        source_key: &str,
        source_region: &str,
    ) -> Result<RemoteObject, Self::Error>;
}
