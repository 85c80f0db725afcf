//! Serializable overlay request.

use serde::{Deserialize, Serialize};
use vout_core::{FourCc, Result};

use crate::overlay::Overlay;

/// Dimensions and display format of an overlay to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub width: u32,
    pub height: u32,
    /// Display format as a FourCC string, e.g. `"YV12"`.
    pub format: FourCc,
}

impl OverlayConfig {
    /// 640x480 planar YUV.
    pub fn vga_yv12() -> Self {
        Self {
            width: 640,
            height: 480,
            format: FourCc::YV12,
        }
    }

    /// 1920x1080 32-bit RGB.
    pub fn hd_rv32() -> Self {
        Self {
            width: 1920,
            height: 1080,
            format: FourCc::RV32,
        }
    }

    /// 320x240 16-bit RGB.
    pub fn qvga_rv16() -> Self {
        Self {
            width: 320,
            height: 240,
            format: FourCc::RV16,
        }
    }

    /// Create the overlay this config describes.
    pub fn create(&self) -> Result<Overlay> {
        Overlay::create(self.width, self.height, self.format)
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::vga_yv12()
    }
}
