use anyhow::{Context, Result};
use clap::Parser;
use pixedit::cleanup::spawn_retention_task;
use pixedit::common::{RetentionConfig, StorageConfig};
use pixedit::logger::init_logger_exe;
use pixedit_web::web::{router, AppState};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(version, about = "Web server that applies simple edits to uploaded images", long_about = None)]
struct Cli {
    #[arg(long, env = "PORT", help = "Port to listen on", default_value_t = 5000)]
    port: u16,
    #[arg(long, help = "Address to bind", default_value = "0.0.0.0")]
    host: IpAddr,
    #[arg(long, help = "Directory for raw uploads", default_value = "uploads")]
    upload_dir: PathBuf,
    #[arg(
        long,
        help = "Directory for processed images",
        default_value = "static/processed"
    )]
    processed_dir: PathBuf,
    #[arg(long, help = "Largest accepted upload in bytes", default_value_t = 8 * 1024 * 1024)]
    max_upload_bytes: usize,
    #[arg(
        long,
        help = "How often old files are swept, e.g. 6h or 30m",
        value_parser = humantime::parse_duration,
        default_value = "6h"
    )]
    cleanup_interval: Duration,
    #[arg(
        long,
        help = "Age after which uploads and processed images are deleted",
        value_parser = humantime::parse_duration,
        default_value = "24h"
    )]
    retention: Duration,
    #[arg(
        long,
        help = "Reject unknown operations instead of copying the image",
        default_value_t = false
    )]
    strict_operations: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger_exe();

    let cli = Cli::parse();

    let storage = StorageConfig::new(
        cli.upload_dir,
        cli.processed_dir,
        cli.max_upload_bytes,
        cli.strict_operations,
    );
    storage.ensure_dirs()?;

    let retention = RetentionConfig::new(cli.cleanup_interval, cli.retention);
    for dir in storage.dirs() {
        spawn_retention_task(dir.to_path_buf(), retention.clone());
    }
    log::info!(
        "Cleanup scheduled every {} for files older than {}",
        humantime::format_duration(retention.interval),
        humantime::format_duration(retention.max_age)
    );

    let app = router(Arc::new(AppState::new(storage)));

    let addr = SocketAddr::new(cli.host, cli.port);
    log::info!("Attempting to bind to {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Successfully bound to http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
