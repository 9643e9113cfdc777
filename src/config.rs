use crate::err::{self, Error};
use crate::snapshot::SnapshotStyle;
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};
use snafu::OptionExt;
use std::{fmt, time::Duration};

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(default))]
pub struct Config {
    /// Bucket that receives both the upload and its snapshot copy
    pub bucket: String,
    /// Region of the bucket
    pub region: String,
    /// Endpoint used for uploads, typically a transfer-accelerated domain. `None` uses the SDK's
    /// default endpoint resolution.
    pub upload_endpoint: Option<String>,
    /// Endpoint used for the server-side copy. `None` means the regular regional endpoint
    /// `https://cos.<region>.myqcloud.com`.
    pub copy_endpoint: Option<String>,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`
    pub force_path_style: bool,
    /// Maximum attempts of a single request, including the first one. Retries are done by the SDK
    /// with its standard backoff.
    pub max_attempts: u32,
    /// Timeout (seconds) of a whole SDK operation, including retries
    pub operation_timeout_s: Option<f64>,
    /// How the timestamp is spliced into the snapshot key
    pub snapshot_style: SnapshotStyle,
    /// Render snapshot timestamps at this fixed offset from UTC instead of the local time zone
    pub utc_offset_hours: Option<i32>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            bucket: "file-1254396400".to_string(),
            region: "ap-shanghai".to_string(),
            upload_endpoint: Some("https://cos.accelerate.myqcloud.com".to_string()),
            copy_endpoint: None,
            force_path_style: false,
            max_attempts: 3,
            operation_timeout_s: None,
            snapshot_style: SnapshotStyle::default(),
            utc_offset_hours: None,
        }
    }
}
impl Config {
    pub fn copy_endpoint(&self) -> String {
        match &self.copy_endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://cos.{}.myqcloud.com", self.region),
        }
    }
    /// `operation_timeout_s` as a `Duration`; it has to be finite and positive.
    pub fn operation_timeout(&self) -> Result<Option<Duration>, Error> {
        match self.operation_timeout_s {
            None => Ok(None),
            Some(seconds) => Duration::try_from_secs_f64(seconds)
                .ok()
                .filter(|timeout| !timeout.is_zero())
                .map(Some)
                .context(err::InvalidTimeout { seconds }),
        }
    }
}

/// Credentials for the object storage. A `session_token` is only needed with temporary keys.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageCredentials {
    pub access_id: String,
    pub access_secret: String,
    pub region: String,
    pub session_token: Option<String>,
}
impl StorageCredentials {
    pub fn new(access_id: String, access_secret: String, region: String) -> Self {
        Self {
            access_id,
            access_secret,
            region,
            session_token: None,
        }
    }
    pub fn with_session_token(self, session_token: Option<String>) -> Self {
        Self {
            session_token,
            ..self
        }
    }
}
impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_id", &self.access_id)
            .field("access_secret", &"** redacted **")
            .field("region", &self.region)
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}
