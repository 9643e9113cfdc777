use crate::*;
use async_trait::async_trait;
use snafu::Snafu;
use std::{
    path::Path,
    sync::{Arc, Mutex},
};

/// A call received by `StorageMock`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Upload {
        bucket: String,
        path: PathBuf,
        key: String,
    },
    Copy {
        dest_bucket: String,
        dest_key: String,
        source_bucket: String,
        source_key: String,
        source_region: String,
    },
}

#[derive(Debug, Snafu)]
pub(crate) enum MockError {
    #[snafu(display("mock storage rejected {}", operation))]
    Rejected { operation: &'static str },
}

/// Storage that records every call and succeeds unless told to fail an operation.
#[derive(Clone, Default)]
pub(crate) struct StorageMock {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_upload: bool,
    fail_copy: bool,
}
impl StorageMock {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn failing_upload() -> Self {
        Self {
            fail_upload: true,
            ..Self::default()
        }
    }
    pub fn failing_copy() -> Self {
        Self {
            fail_copy: true,
            ..Self::default()
        }
    }
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
    pub fn count_uploads(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Upload { .. }))
            .count()
    }
    pub fn count_copies(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Copy { .. }))
            .count()
    }
}

#[async_trait]
impl Storage for StorageMock {
    type Error = MockError;

    async fn upload(
        &self,
        bucket: &str,
        local_path: &Path,
        remote_key: &str,
    ) -> Result<RemoteObject, MockError> {
        self.calls.lock().unwrap().push(Call::Upload {
            bucket: bucket.to_owned(),
            path: local_path.to_owned(),
            key: remote_key.to_owned(),
        });
        if self.fail_upload {
            return Rejected { operation: "upload" }.fail();
        }
        Ok(RemoteObject {
            e_tag: Some("\"upload-etag\"".into()),
            ..RemoteObject::new(bucket, remote_key)
        })
    }

    async fn copy(
        &self,
        dest_bucket: &str,
        dest_key: &str,
        source_bucket: &str,
        source_key: &str,
        source_region: &str,
    ) -> Result<RemoteObject, MockError> {
        self.calls.lock().unwrap().push(Call::Copy {
            dest_bucket: dest_bucket.to_owned(),
            dest_key: dest_key.to_owned(),
            source_bucket: source_bucket.to_owned(),
            source_key: source_key.to_owned(),
            source_region: source_region.to_owned(),
        });
        if self.fail_copy {
            return Rejected { operation: "copy" }.fail();
        }
        Ok(RemoteObject {
            e_tag: Some("\"copy-etag\"".into()),
            ..RemoteObject::new(dest_bucket, dest_key)
        })
    }
}
