//! `Storage` on top of `aws-sdk-s3`, for S3 and S3-compatible services.
//!
//! Two clients are kept: uploads go through `Config::upload_endpoint` (usually a
//! transfer-accelerated domain), while the server-side copy goes through the regular regional
//! endpoint, since accelerated domains do not serve copy requests.
use crate::config::{Config, StorageCredentials};
use crate::err::{self, Error, S3Error};
use crate::storage::{RemoteObject, Storage};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::MetadataDirective;
use aws_sdk_s3::Client;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use snafu::ResultExt;
use std::path::Path;
use tracing::debug;

/// Characters left as-is in the `x-amz-copy-source` header.
const COPY_SOURCE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Clone, Debug)]
pub struct S3Storage {
    upload_client: Client,
    copy_client: Client,
}

impl S3Storage {
    /// Build both clients from static credentials. Nothing is sent over the network here.
    pub async fn new(credentials: &StorageCredentials, cfg: &Config) -> Result<Self, Error> {
        let operation_timeout = cfg.operation_timeout()?;
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(credentials.region.clone()))
            .credentials_provider(Credentials::new(
                credentials.access_id.clone(),
                credentials.access_secret.clone(),
                credentials.session_token.clone(),
                None,
                "s3-snapshot",
            ))
            .retry_config(RetryConfig::standard().with_max_attempts(cfg.max_attempts.max(1)));
        if let Some(timeout) = operation_timeout {
            loader = loader.timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(timeout)
                    .build(),
            );
        }
        let shared = loader.load().await;

        let copy_endpoint = cfg.copy_endpoint();
        debug!(
            upload_endpoint = ?cfg.upload_endpoint,
            %copy_endpoint,
            region = %credentials.region,
            "configured S3 clients"
        );
        Ok(Self {
            upload_client: client(&shared, cfg.upload_endpoint.as_deref(), cfg.force_path_style),
            copy_client: client(&shared, Some(&copy_endpoint), cfg.force_path_style),
        })
    }

    /// Use already configured clients, e.g. the same one for both operations.
    pub fn from_clients(upload_client: Client, copy_client: Client) -> Self {
        Self {
            upload_client,
            copy_client,
        }
    }
}

fn client(shared: &SdkConfig, endpoint: Option<&str>, force_path_style: bool) -> Client {
    let mut builder = aws_sdk_s3::config::Builder::from(shared).force_path_style(force_path_style);
    if let Some(endpoint) = endpoint {
        builder = builder.endpoint_url(endpoint);
    }
    Client::from_conf(builder.build())
}

/// Value of the `x-amz-copy-source` header for `bucket/key`, with the key percent-encoded.
pub fn copy_source(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, utf8_percent_encode(key, COPY_SOURCE))
}

#[async_trait]
impl Storage for S3Storage {
    type Error = S3Error;

    async fn upload(
        &self,
        bucket: &str,
        local_path: &Path,
        remote_key: &str,
    ) -> Result<RemoteObject, S3Error> {
        let body = ByteStream::from_path(local_path)
            .await
            .context(err::ReadSource { path: local_path })?;
        let output = self
            .upload_client
            .put_object()
            .bucket(bucket)
            .key(remote_key)
            .body(body)
            .send()
            .await
            .context(err::PutObject { key: remote_key })?;
        debug!(bucket, key = remote_key, e_tag = ?output.e_tag(), "put object");
        Ok(RemoteObject {
            e_tag: output.e_tag().map(str::to_owned),
            version_id: output.version_id().map(str::to_owned),
            ..RemoteObject::new(bucket, remote_key)
        })
    }

    /// The copy replaces the object's metadata rather than carrying it over from the source.
    /// `source_region` is informational: S3 resolves the source bucket's region itself.
    async fn copy(
        &self,
        dest_bucket: &str,
        dest_key: &str,
        source_bucket: &str,
        source_key: &str,
        source_region: &str,
    ) -> Result<RemoteObject, S3Error> {
        let copy_source = copy_source(source_bucket, source_key);
        let output = self
            .copy_client
            .copy_object()
            .bucket(dest_bucket)
            .key(dest_key)
            .copy_source(&copy_source)
            .metadata_directive(MetadataDirective::Replace)
            .send()
            .await
            .context(err::CopyObject {
                copy_source: &copy_source,
                key: dest_key,
            })?;
        let e_tag = output
            .copy_object_result()
            .and_then(|result| result.e_tag())
            .map(str::to_owned);
        debug!(%copy_source, source_region, bucket = dest_bucket, key = dest_key, ?e_tag, "copied object");
        Ok(RemoteObject {
            e_tag,
            version_id: output.version_id().map(str::to_owned),
            ..RemoteObject::new(dest_bucket, dest_key)
        })
    }
}
