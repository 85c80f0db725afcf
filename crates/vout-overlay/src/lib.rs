//! Vout Overlay - Shared frame buffers between decoder and renderer
//!
//! Architecture:
//! - `FrameBuffer`: one contiguous, never-resized pixel allocation
//! - `Overlay`: owns a buffer and its lock, exposes the display-order plane table
//! - `OverlayGuard`: scoped lock, the only safe way to touch pixels
//! - `bind`: hands a decoder zero-copy plane pointers for its own pixel format

pub mod bind;
pub mod buffer;
pub mod config;
pub mod overlay;

pub use bind::{bind, PictureDescriptor};
pub use buffer::FrameBuffer;
pub use config::OverlayConfig;
pub use overlay::{Overlay, OverlayGuard, OverlayState, VoutOverlay};
