//! # S3 snapshot upload
//! Upload a file to S3-compatible object storage, then keep a point-in-time copy of it next to
//! the uploaded object.
//!
//! - Describe the upload with a `TransferRequest` and run it with `snapshot_upload`.
//! - `S3Storage` is the `aws-sdk-s3` implementation of the `Storage` capability; anything else
//!   implementing `Storage` works as well.
//! - Snapshot keys embed a timestamp: `dir/name.ext` is copied to
//!   `dir/name_2024-01-02 03:04:05_ext` (or `..._03:04:05.ext` with
//!   `SnapshotStyle::KeepExtension`).

use crate::err::BoxError;
use futures_stopwatch::try_stopwatch;
use std::{path::PathBuf, time::Duration};
use tracing::info;

mod config;
pub mod err;
pub mod s3;
pub mod snapshot;
mod storage;
mod workflow;

pub use config::*;
pub use err::Error;
pub use s3::S3Storage;
pub use snapshot::{Clock, SnapshotStyle, SystemClock};
pub use storage::*;
pub use workflow::*;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod test;

/// Result of one storage operation of the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    /// The object as reported by the storage
    pub object: RemoteObject,
    /// Time from issuing the request until the storage answered, including any retries it did
    pub time: Duration,
}

/// Result of a successful `snapshot_upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotReport {
    pub upload: TransferReport,
    pub copy: TransferReport,
}
impl SnapshotReport {
    pub fn snapshot_key(&self) -> &str {
        &self.copy.object.key
    }
}
