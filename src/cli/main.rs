use anyhow::{Context, Result};
use clap::Parser;
use pixedit::cleanup::sweep_directory;
use pixedit::common::StorageConfig;
use pixedit::logger::init_logger_exe;
use pixedit::process::Dispatcher;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(version, about = "A CLI tool to edit images and sweep old files", long_about = None)]
struct Cli {
    #[arg(long, help = "input file in image (png, webp, jpg, jpeg, gif) format")]
    image: Option<PathBuf>,
    #[arg(
        long,
        help = "operation to apply, e.g. cgray, rotate_90, resize_50, bright_inc",
        default_value = "copy"
    )]
    operation: String,
    #[arg(
        long,
        help = "directory to write the processed image to",
        default_value = "static/processed"
    )]
    output_dir: PathBuf,
    #[arg(long, help = "reject unknown operations", default_value_t = false)]
    strict_operations: bool,
    #[arg(long, help = "delete old files directly inside this directory")]
    sweep: Option<PathBuf>,
    #[arg(
        long,
        help = "age after which --sweep deletes a file, e.g. 24h",
        value_parser = humantime::parse_duration,
        default_value = "24h"
    )]
    retention: Duration,
}

fn main() -> Result<()> {
    init_logger_exe();
    let cli = Cli::parse();

    if let Some(image) = &cli.image {
        let config = StorageConfig {
            processed_dir: cli.output_dir.clone(),
            strict_operations: cli.strict_operations,
            ..Default::default()
        };
        std::fs::create_dir_all(&config.processed_dir).with_context(|| {
            format!("Failed to create {}", config.processed_dir.display())
        })?;

        let dispatcher = Dispatcher::new(config);
        let operation = dispatcher.parse_operation(Some(&cli.operation))?;
        let output = dispatcher
            .process(image, &operation)
            .with_context(|| format!("Failed to apply {} to {}", operation, image.display()))?;
        println!("{}", output.display());
    }

    if let Some(dir) = &cli.sweep {
        let deleted = sweep_directory(dir, cli.retention)?;
        log::info!("Sweep of {} removed {} files", dir.display(), deleted);
    }

    if cli.image.is_none() && cli.sweep.is_none() {
        log::warn!("Nothing to do, pass --image and/or --sweep");
    }

    Ok(())
}
