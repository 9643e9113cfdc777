use crate::storage::RemoteObject;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::copy_object::CopyObjectError;
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::primitives::ByteStreamError;
use snafu::Snafu;
use std::path::PathBuf;

/// Boxed error of a `Storage` implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The step of the snapshot workflow an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Upload,
    Copy,
}

#[derive(Snafu, Debug)]
#[snafu(visibility = "pub")]
pub enum Error {
    #[snafu(display(
        "Upload of {} to s3://{}/{} failed: {}",
        path.display(),
        bucket,
        key,
        source
    ))]
    Upload {
        path: PathBuf,
        bucket: String,
        key: String,
        source: BoxError,
    },
    /// The object at `uploaded` stays in place; there is no rollback.
    #[snafu(display(
        "Copy of s3://{}/{} to '{}' failed (uploaded object kept): {}",
        uploaded.bucket,
        uploaded.key,
        key,
        source
    ))]
    Copy {
        uploaded: RemoteObject,
        key: String,
        source: BoxError,
    },
    #[snafu(display(
        "Destination key '{}' has no '<name>.<extension>' final segment",
        key
    ))]
    KeyFormat { key: String },
    #[snafu(display("Missing required argument {}", name))]
    MissingArgument { name: String },
    #[snafu(display("UTC offset of {} hours is out of range", hours))]
    InvalidUtcOffset { hours: i32 },
    #[snafu(display("Operation timeout of {} seconds is not a positive, finite duration", seconds))]
    InvalidTimeout { seconds: f64 },
}

impl Error {
    /// Which workflow step failed, if the error came from a storage call.
    pub fn failed_step(&self) -> Option<Step> {
        match self {
            Error::Upload { .. } => Some(Step::Upload),
            Error::Copy { .. } => Some(Step::Copy),
            _ => None,
        }
    }
}

/// Errors of the `aws-sdk-s3` backed storage.
#[derive(Snafu, Debug)]
#[snafu(visibility = "pub")]
pub enum S3Error {
    #[snafu(display("Reading {}: {}", path.display(), source))]
    ReadSource {
        path: PathBuf,
        source: ByteStreamError,
    },
    #[snafu(display("S3 'put object' error on key '{}': {:?}", key, source))]
    PutObject {
        key: String,
        source: SdkError<PutObjectError>,
    },
    #[snafu(display(
        "S3 'copy object' error from '{}' to '{}': {:?}",
        copy_source,
        key,
        source
    ))]
    CopyObject {
        copy_source: String,
        key: String,
        source: SdkError<CopyObjectError>,
    },
}
