//! Vout Core - Pixel format vocabulary for video overlays
//!
//! This crate provides the pure, allocation-free parts of the overlay layer:
//! - Display-side formats (FourCC addressed) and decoder-side formats
//! - The catalog mapping between the two format families
//! - Plane layout rules for contiguous frame allocations

pub mod catalog;
pub mod error;
pub mod format;
pub mod layout;

pub use catalog::{best_decoder_format, decoder_format_for, is_compatible, CatalogEntry};
pub use error::{Result, VoutError};
pub use format::{DecoderPixelFormat, FourCc, PixelFormat, PlaneSpec};
pub use layout::{FrameLayout, PlaneLayout, MAX_PLANES};
