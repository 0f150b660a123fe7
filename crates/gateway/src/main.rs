//! Bucket index gateway - serves an object store bucket over HTTP
//!
//! File-like paths stream object contents; everything else renders an HTML
//! index of the folders and files under that prefix.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use service::{Config, ServiceState};
use store::ObjectStoreConfig;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    /// Google Cloud Storage
    Gcs,
    /// S3 or an S3-compatible service
    S3,
    /// A directory on the local filesystem
    Local,
    /// Empty in-memory store, for smoke testing
    Memory,
}

/// Serve an object store bucket as browsable directory listings
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on for HTTP requests
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Bucket to serve (gcs and s3 backends)
    #[arg(short, long, env = "BUCKET")]
    bucket: Option<String>,

    /// Object store backend
    #[arg(long, env = "STORE_BACKEND", value_enum, default_value_t = Backend::Gcs)]
    backend: Backend,

    /// Directory to serve (local backend)
    #[arg(long, env = "STORE_ROOT")]
    root: Option<PathBuf>,

    /// Custom endpoint for S3-compatible services
    #[arg(long, env = "S3_ENDPOINT")]
    endpoint: Option<String>,

    /// S3 region
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn store_config(&self) -> Result<ObjectStoreConfig> {
        let config = match self.backend {
            Backend::Gcs => ObjectStoreConfig::Gcs {
                bucket: self.require_bucket()?,
            },
            Backend::S3 => ObjectStoreConfig::S3 {
                bucket: self.require_bucket()?,
                endpoint: self.endpoint.clone(),
                region: self.region.clone(),
            },
            Backend::Local => match &self.root {
                Some(path) => ObjectStoreConfig::Local { path: path.clone() },
                None => bail!("--root (or STORE_ROOT) is required for the local backend"),
            },
            Backend::Memory => ObjectStoreConfig::Memory,
        };
        Ok(config)
    }

    fn require_bucket(&self) -> Result<String> {
        match self.bucket.as_deref() {
            Some(bucket) if !bucket.is_empty() => Ok(bucket.to_string()),
            _ => bail!("--bucket (or BUCKET) is required for the {:?} backend", self.backend),
        }
    }

    fn config(&self) -> Result<Config> {
        Ok(Config {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port),
            store: self.store_config()?,
            log_level: self.log_level(),
        })
    }

    fn log_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    let env_filter = EnvFilter::builder()
        .with_default_directive(args.log_level().into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(non_blocking_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stdout_layer).init();

    tracing::info!("Starting bucket index gateway");

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let state = match ServiceState::from_config(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to create service state: {}", e);
            std::process::exit(1);
        }
    };

    // Set up graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received shutdown signal"),
            Err(e) => tracing::error!("Failed to listen for ctrl+c: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    service::http::run(&config, state, shutdown_rx).await?;

    tracing::info!("Gateway shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("bucket-index").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_gcs_bucket() {
        let args = parse(&["--backend", "gcs", "--bucket", "my-bucket", "--port", "9000"]);
        let config = args.config().unwrap();
        assert_eq!(config.listen_addr.port(), 9000);
        assert!(matches!(
            config.store,
            ObjectStoreConfig::Gcs { ref bucket } if bucket == "my-bucket"
        ));
    }

    #[test]
    fn test_s3_with_endpoint() {
        let args = parse(&[
            "--backend",
            "s3",
            "--bucket",
            "assets",
            "--endpoint",
            "http://localhost:9000",
            "--region",
            "eu-west-1",
        ]);
        match args.store_config().unwrap() {
            ObjectStoreConfig::S3 {
                bucket,
                endpoint,
                region,
            } => {
                assert_eq!(bucket, "assets");
                assert_eq!(endpoint.as_deref(), Some("http://localhost:9000"));
                assert_eq!(region.as_deref(), Some("eu-west-1"));
            }
            other => panic!("expected s3 config, got {other:?}"),
        }
    }

    #[test]
    fn test_cloud_backends_need_a_bucket() {
        for backend in ["gcs", "s3"] {
            let mut args = parse(&["--backend", backend]);
            args.bucket = None;
            assert!(args.store_config().is_err());

            args.bucket = Some(String::new());
            assert!(args.store_config().is_err());
        }
    }

    #[test]
    fn test_local_needs_a_root() {
        let mut args = parse(&["--backend", "local"]);
        args.root = None;
        assert!(args.store_config().is_err());

        let args = parse(&["--backend", "local", "--root", "/srv/site"]);
        assert!(matches!(
            args.store_config().unwrap(),
            ObjectStoreConfig::Local { path } if path == PathBuf::from("/srv/site")
        ));
    }

    #[test]
    fn test_log_level() {
        let args = parse(&["--backend", "memory", "--log-level", "debug"]);
        let config = args.config().unwrap();
        assert_eq!(config.log_level, tracing::Level::DEBUG);

        let args = parse(&["--backend", "memory", "--log-level", "chatty"]);
        assert_eq!(args.log_level(), tracing::Level::INFO);
    }
}
