//! Trisplat Viewer
//!
//! Loads a trained triangle splat checkpoint and serves it with live
//! controls:
//! - Sigma slider (edge softness, log domain)
//! - Opacity Scale slider (opacity floor as a percentage)
//! - Reset View button (moves every client camera back to the default pose)

mod app;
mod console;
mod controller;
mod error;

use app::{AppBuilder, LoggingConfig};
use clap::Parser;
use std::path::PathBuf;
use trisplat_data::{ColorMode, DEFAULT_CHECKPOINT_PATH};

/// Trisplat - Triangle Splat Viewer
#[derive(Parser, Debug)]
#[command(name = "trisplat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the checkpoint tensor dictionary
    #[arg(long, default_value = DEFAULT_CHECKPOINT_PATH)]
    checkpoint_path: PathBuf,

    /// Bake the DC color term into RGB instead of passing SH coefficients
    #[arg(long)]
    use_direct_colors: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Do not read control commands from stdin
    #[arg(long)]
    no_console: bool,
}

impl Args {
    fn color_mode(&self) -> ColorMode {
        if self.use_direct_colors {
            ColorMode::Direct
        } else {
            ColorMode::SphericalHarmonics
        }
    }
}

fn main() {
    let args = Args::parse();

    let result = AppBuilder::new()
        .with_checkpoint_path(args.checkpoint_path.clone())
        .with_color_mode(args.color_mode())
        .with_logging(LoggingConfig {
            level: args.log_level.clone(),
            enable_tracy: cfg!(feature = "tracy"),
        })
        .with_console(!args.no_console)
        .run();

    if let Err(e) = result {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}
