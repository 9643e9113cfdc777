use clap::Parser;
use s3_snapshot::*;
use snafu::OptionExt;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upload a file to object storage and keep a timestamped copy of it in the same bucket
#[derive(Parser, Debug)]
#[clap(name = "upload", version)]
struct Args {
    /// Access key ID
    #[clap(long = "si", env = "SNAPSHOT_SECRET_ID")]
    secret_id: String,
    /// Access key secret
    #[clap(long = "sk", env = "SNAPSHOT_SECRET_KEY", hide_env_values = true)]
    secret_key: String,
    /// Session token, only for temporary credentials
    #[clap(long, env = "SNAPSHOT_SESSION_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// File to upload, e.g. dist/main.exe
    #[clap(long = "sf")]
    source: Option<PathBuf>,
    /// Destination key in the bucket, e.g. ruiyang/ruiyang.exe
    #[clap(long = "df")]
    destination: Option<String>,
    #[clap(long)]
    bucket: Option<String>,
    #[clap(long)]
    region: Option<String>,
    /// Endpoint for the upload, e.g. a transfer-accelerated domain
    #[clap(long)]
    upload_endpoint: Option<String>,
    /// Endpoint for the copy [default: https://cos.<region>.myqcloud.com]
    #[clap(long)]
    copy_endpoint: Option<String>,
    /// Use path-style bucket addressing
    #[clap(long)]
    path_style: bool,
    /// Name snapshots `name_<timestamp>.ext` instead of `name_<timestamp>_ext`
    #[clap(long)]
    keep_extension: bool,
    /// Timestamp snapshots at this offset from UTC (hours) instead of local time
    #[clap(long, allow_hyphen_values = true)]
    utc_offset: Option<i32>,
    /// Attempts per request, including the first
    #[clap(long)]
    max_attempts: Option<u32>,
    /// Timeout of each storage operation in seconds
    #[clap(long)]
    operation_timeout: Option<f64>,
}

impl Args {
    fn config(&self) -> Config {
        let default = Config::default();
        Config {
            bucket: self.bucket.clone().unwrap_or(default.bucket),
            region: self.region.clone().unwrap_or(default.region),
            upload_endpoint: self.upload_endpoint.clone().or(default.upload_endpoint),
            copy_endpoint: self.copy_endpoint.clone().or(default.copy_endpoint),
            force_path_style: self.path_style || default.force_path_style,
            max_attempts: self.max_attempts.unwrap_or(default.max_attempts),
            operation_timeout_s: self.operation_timeout.or(default.operation_timeout_s),
            snapshot_style: if self.keep_extension {
                SnapshotStyle::KeepExtension
            } else {
                default.snapshot_style
            },
            utc_offset_hours: self.utc_offset.or(default.utc_offset_hours),
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "s3_snapshot=info,upload=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(report) => info!(
            uploaded = %report.upload.object.key,
            snapshot = %report.snapshot_key(),
            "finished"
        ),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Everything a run needs, assembled from the command line without touching the network.
fn request(args: Args) -> Result<(Config, StorageCredentials, TransferRequest), Error> {
    let cfg = args.config();
    let source = args.source.context(err::MissingArgument { name: "--sf" })?;
    let destination = args
        .destination
        .context(err::MissingArgument { name: "--df" })?;

    let credentials = StorageCredentials::new(args.secret_id, args.secret_key, cfg.region.clone())
        .with_session_token(args.token);
    let request = TransferRequest::new(source, destination, cfg.bucket.clone(), cfg.region.clone());
    Ok((cfg, credentials, request))
}

async fn run(args: Args) -> Result<SnapshotReport, Error> {
    let (cfg, credentials, request) = request(args)?;
    let clock = SystemClock::from_config(&cfg)?;
    let storage = S3Storage::new(&credentials, &cfg).await?;

    snapshot_upload(&storage, &clock, &request, cfg.snapshot_style).await
}
