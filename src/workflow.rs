use super::*;
use crate::snapshot::{Clock, SnapshotStyle, SplitKey};
use snafu::ResultExt;

/// One file to upload, and where.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    pub source: PathBuf,
    pub destination_key: String,
    pub bucket: String,
    /// Region of `bucket`, passed on as the source region of the copy
    pub region: String,
}
impl TransferRequest {
    pub fn new(source: PathBuf, destination_key: String, bucket: String, region: String) -> Self {
        Self {
            source,
            destination_key,
            bucket,
            region,
        }
    }
}

/// Upload `request.source` to `request.destination_key`, then copy the uploaded object to a
/// timestamped key next to it.
///
/// The destination key is validated before anything is sent, so a key that cannot carry a
/// timestamp fails with `Error::KeyFormat` without touching the storage. The copy is only
/// attempted once the upload has succeeded; if the copy fails, the uploaded object is left in
/// place and reported in `Error::Copy`.
///
/// The timestamp is taken from `clock` after the upload finished, formatted as
/// [`TIMESTAMP_FORMAT`](snapshot/constant.TIMESTAMP_FORMAT.html).
pub async fn snapshot_upload<S, C>(
    storage: &S,
    clock: &C,
    request: &TransferRequest,
    style: SnapshotStyle,
) -> Result<SnapshotReport, Error>
where
    S: Storage + Sync,
    C: Clock,
{
    let TransferRequest {
        source,
        destination_key,
        bucket,
        region,
    } = request;
    let split = SplitKey::parse(destination_key)?;

    info!(path = %source.display(), %bucket, key = %destination_key, "uploading");
    let (uploaded, upload_time) = try_stopwatch(storage.upload(bucket, source, destination_key))
        .await
        .map_err(|e| Box::new(e) as BoxError)
        .context(err::Upload {
            path: source,
            bucket,
            key: destination_key,
        })?;
    info!(key = %uploaded.key, id = ?uploaded.id(), "upload done in {:?}", upload_time);

    let snapshot_key = split.snapshot_key(clock.now(), style);
    info!(from = %destination_key, to = %snapshot_key, "copying to snapshot");
    let (copied, copy_time) = try_stopwatch(storage.copy(
        bucket,
        &snapshot_key,
        bucket,
        destination_key,
        region,
    ))
    .await
    .map_err(|e| Box::new(e) as BoxError)
    .with_context(|| err::Copy {
        uploaded: uploaded.clone(),
        key: snapshot_key.clone(),
    })?;
    info!(key = %copied.key, id = ?copied.id(), "snapshot done in {:?}", copy_time);

    Ok(SnapshotReport {
        upload: TransferReport {
            object: uploaded,
            time: upload_time,
        },
        copy: TransferReport {
            object: copied,
            time: copy_time,
        },
    })
}
