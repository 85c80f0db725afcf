//! Vout pipeline runner
//!
//! Creates an overlay from a JSON config (or defaults), then runs a decoder
//! thread and a render thread against it and reports what the render side saw.
//!
//! Usage: vout-pipeline [config.json]

mod pipeline;

use anyhow::{bail, Result};
use pipeline::PipelineConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Vout pipeline starting...");

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!("Loading config from {}", path.display());
            PipelineConfig::load(&path)?
        }
        None => PipelineConfig::default(),
    };

    let report = pipeline::run(&config)?;
    if report.torn_frames > 0 {
        bail!(
            "{} of {} frames were torn",
            report.torn_frames,
            report.frames_written
        );
    }

    info!(
        "Verified {} frames in {:?}",
        report.frames_verified, report.elapsed
    );
    Ok(())
}
