//! Producer/consumer handoff over a single overlay.
//!
//! The producer plays the decoder: it binds a descriptor in its own pixel
//! format and writes each frame through it under the overlay lock. The
//! consumer plays the render surface: it locks, reads the display planes and
//! checks every byte. Frame sequencing is done with channels, the lock only
//! provides exclusion.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vout_core::{best_decoder_format, DecoderPixelFormat, Result, VoutError};
use vout_overlay::{bind, Overlay, OverlayConfig};

/// Pipeline run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub overlay: OverlayConfig,
    /// Number of frames to push through the overlay.
    pub frames: u32,
    /// Decoder output format. Defaults to the best match for the overlay.
    pub decoder_format: Option<DecoderPixelFormat>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            overlay: OverlayConfig::default(),
            frames: 120,
            decoder_format: None,
        }
    }
}

impl PipelineConfig {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| VoutError::Config(format!("{}: {e}", path.display())))
    }
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub frames_written: u32,
    pub frames_verified: u32,
    pub torn_frames: u32,
    pub elapsed: Duration,
}

/// Fill byte for a plane of a frame.
pub fn pattern(frame: u32, plane: usize) -> u8 {
    (frame as u8)
        .wrapping_mul(31)
        .wrapping_add((plane as u8).wrapping_mul(85))
}

/// Run the handoff for `config.frames` frames.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let overlay = config.overlay.create()?;
    if !overlay.is_ready() {
        warn!(format = %config.overlay.format, "overlay has no usable format, nothing to play");
        return Ok(PipelineReport::default());
    }

    let decoder_format = config
        .decoder_format
        .or_else(|| best_decoder_format(overlay.format()))
        .ok_or_else(|| VoutError::UnsupportedFormat(overlay.format().to_string()))?;

    // Surface an incompatible configuration before spawning anything
    bind(&overlay, decoder_format)?;

    info!(
        width = overlay.width(),
        height = overlay.height(),
        display = %overlay.format(),
        decoder = %decoder_format,
        frames = config.frames,
        "starting pipeline"
    );

    let started = Instant::now();
    let (ready_tx, ready_rx) = bounded::<u32>(1);
    let (free_tx, free_rx) = bounded::<()>(1);
    let overlay = &overlay;

    let (written, (verified, torn)) = thread::scope(|s| {
        let producer = s.spawn(move || {
            produce(overlay, decoder_format, config.frames, ready_tx, free_rx)
        });
        let consumer = s.spawn(move || consume(overlay, ready_rx, free_tx));
        (
            producer.join().unwrap_or_else(|e| std::panic::resume_unwind(e)),
            consumer.join().unwrap_or_else(|e| std::panic::resume_unwind(e)),
        )
    });

    let report = PipelineReport {
        frames_written: written?,
        frames_verified: verified,
        torn_frames: torn,
        elapsed: started.elapsed(),
    };
    info!(
        written = report.frames_written,
        verified = report.frames_verified,
        torn = report.torn_frames,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "pipeline finished"
    );
    Ok(report)
}

fn produce(
    overlay: &Overlay,
    format: DecoderPixelFormat,
    frames: u32,
    ready: crossbeam_channel::Sender<u32>,
    free: crossbeam_channel::Receiver<()>,
) -> Result<u32> {
    let desc = bind(overlay, format)?;
    let mut written = 0;

    for frame in 0..frames {
        if frame > 0 && free.recv().is_err() {
            break;
        }

        let mut guard = overlay.lock();
        for plane in 0..desc.plane_count() {
            let rows = overlay.plane_layout(plane).map_or(0, |l| l.rows);
            let row = vec![pattern(frame, plane); desc.linesize()[plane]];
            for y in 0..rows {
                desc.write_row(&mut guard, plane, y, &row);
            }
        }
        guard.unlock();

        written += 1;
        if ready.send(frame).is_err() {
            break;
        }
    }

    debug!(written, "producer done");
    Ok(written)
}

fn consume(
    overlay: &Overlay,
    ready: crossbeam_channel::Receiver<u32>,
    free: crossbeam_channel::Sender<()>,
) -> (u32, u32) {
    let mut verified = 0;
    let mut torn = 0;

    for frame in ready {
        let guard = overlay.lock();
        let intact = (0..guard.plane_count()).all(|plane| {
            let expected = pattern(frame, plane);
            guard.plane(plane).iter().all(|&b| b == expected)
        });
        guard.unlock();

        if intact {
            verified += 1;
        } else {
            warn!(frame, "frame content did not match what was written");
            torn += 1;
        }

        // Producer may already be finished
        let _ = free.send(());
    }

    debug!(verified, torn, "consumer done");
    (verified, torn)
}
