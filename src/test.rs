use crate::{err::Step, mock::*, snapshot::TIMESTAMP_FORMAT, *};
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use std::cell::Cell;

const BUCKET: &str = "file-1254396400";
const REGION: &str = "ap-shanghai";

fn request(key: &str) -> TransferRequest {
    TransferRequest::new(
        PathBuf::from("dist/main.exe"),
        key.to_string(),
        BUCKET.to_string(),
        REGION.to_string(),
    )
}

fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .and_then(|d| d.and_hms_opt(3, 4, 5))
        .unwrap()
}

#[tokio::test]
async fn uploads_then_copies_to_timestamped_key() {
    let storage = StorageMock::new();
    let report = snapshot_upload(
        &storage,
        &fixed_time,
        &request("ruiyang/ruiyang.exe"),
        SnapshotStyle::Compat,
    )
    .await
    .unwrap();

    assert_eq!(
        storage.calls(),
        vec![
            Call::Upload {
                bucket: BUCKET.into(),
                path: "dist/main.exe".into(),
                key: "ruiyang/ruiyang.exe".into(),
            },
            Call::Copy {
                dest_bucket: BUCKET.into(),
                dest_key: "ruiyang/ruiyang_2024-01-02 03:04:05_exe".into(),
                source_bucket: BUCKET.into(),
                source_key: "ruiyang/ruiyang.exe".into(),
                source_region: REGION.into(),
            },
        ]
    );
    assert_eq!(report.upload.object.key, "ruiyang/ruiyang.exe");
    assert_eq!(report.upload.object.id(), Some("\"upload-etag\""));
    assert_eq!(report.snapshot_key(), "ruiyang/ruiyang_2024-01-02 03:04:05_exe");
}

#[tokio::test]
async fn keep_extension_style_in_workflow() {
    let storage = StorageMock::new();
    let report = snapshot_upload(
        &storage,
        &fixed_time,
        &request("backups/db.tar.gz"),
        SnapshotStyle::KeepExtension,
    )
    .await
    .unwrap();
    assert_eq!(report.snapshot_key(), "backups/db.tar_2024-01-02 03:04:05.gz");
}

#[tokio::test]
async fn system_clock_timestamp_has_expected_format() {
    let storage = StorageMock::new();
    let report = snapshot_upload(
        &storage,
        &SystemClock::Local,
        &request("ruiyang/ruiyang.exe"),
        SnapshotStyle::KeepExtension,
    )
    .await
    .unwrap();

    let ts = report
        .snapshot_key()
        .strip_prefix("ruiyang/ruiyang_")
        .and_then(|rest| rest.strip_suffix(".exe"))
        .unwrap();
    assert_eq!(ts.len(), "YYYY-MM-DD HH:MM:SS".len());
    assert!(NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).is_ok());
}

#[tokio::test]
async fn failed_upload_skips_copy() {
    let storage = StorageMock::failing_upload();
    let err = snapshot_upload(
        &storage,
        &fixed_time,
        &request("ruiyang/ruiyang.exe"),
        SnapshotStyle::Compat,
    )
    .await
    .unwrap_err();

    assert_eq!(err.failed_step(), Some(Step::Upload));
    assert!(err.to_string().contains("mock storage rejected upload"));
    assert_eq!(storage.count_uploads(), 1);
    assert_eq!(storage.count_copies(), 0);
}

#[tokio::test]
async fn failed_copy_keeps_upload() {
    let storage = StorageMock::failing_copy();
    let err = snapshot_upload(
        &storage,
        &fixed_time,
        &request("ruiyang/ruiyang.exe"),
        SnapshotStyle::Compat,
    )
    .await
    .unwrap_err();

    assert_eq!(err.failed_step(), Some(Step::Copy));
    match &err {
        Error::Copy { uploaded, key, .. } => {
            assert_eq!(uploaded.key, "ruiyang/ruiyang.exe");
            assert_eq!(key, "ruiyang/ruiyang_2024-01-02 03:04:05_exe");
        }
        other => panic!("expected copy error, got {:?}", other),
    }
    assert_eq!(storage.count_uploads(), 1);
    assert_eq!(storage.count_copies(), 1);
}

#[tokio::test]
async fn key_without_dot_fails_before_any_call() {
    let storage = StorageMock::new();
    let err = snapshot_upload(
        &storage,
        &fixed_time,
        &request("ruiyang"),
        SnapshotStyle::Compat,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::KeyFormat { ref key } if key == "ruiyang"));
    assert!(storage.calls().is_empty());
}

#[tokio::test]
async fn repeated_runs_give_distinct_snapshots() {
    let storage = StorageMock::new();
    let tick = Cell::new(fixed_time());
    let clock = || {
        let now = tick.get();
        tick.set(now + ChronoDuration::seconds(1));
        now
    };
    let req = request("ruiyang/ruiyang.exe");

    let first = snapshot_upload(&storage, &clock, &req, SnapshotStyle::Compat)
        .await
        .unwrap();
    let second = snapshot_upload(&storage, &clock, &req, SnapshotStyle::Compat)
        .await
        .unwrap();

    assert_ne!(first.snapshot_key(), second.snapshot_key());
    assert_eq!(first.upload.object, second.upload.object);
    assert_eq!(storage.count_uploads(), 2);
    assert_eq!(storage.count_copies(), 2);
}
