//! Plane layout of a single contiguous frame allocation.
//!
//! Strides are the natural row width in bytes with no alignment padding, so
//! the total size matches the decoder library's picture size at alignment 1.

use smallvec::SmallVec;

use crate::error::{Result, VoutError};
use crate::format::DecoderPixelFormat;

/// Maximum number of planes any supported format uses.
pub const MAX_PLANES: usize = 4;

/// Position and geometry of one plane inside a frame allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    /// Byte offset of the first row from the allocation start
    pub offset: usize,
    /// Bytes per row
    pub stride: usize,
    /// Number of rows
    pub rows: usize,
}

impl PlaneLayout {
    /// Total bytes covered by this plane.
    #[inline]
    pub fn len(&self) -> usize {
        self.stride * self.rows
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One past the last byte of this plane.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.len()
    }
}

/// Layout of all planes of a frame, in the decoder's native plane order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    pub format: DecoderPixelFormat,
    pub width: u32,
    pub height: u32,
    planes: SmallVec<[PlaneLayout; MAX_PLANES]>,
    size: usize,
}

impl FrameLayout {
    /// Compute the unpadded layout for a frame.
    ///
    /// Fails for a zero dimension, or when the size does not fit in `usize`.
    pub fn compute(format: DecoderPixelFormat, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(VoutError::ZeroSize { width, height });
        }

        let overflow = || VoutError::AllocationFailed { bytes: usize::MAX };

        let mut planes = SmallVec::new();
        let mut offset = 0usize;
        for spec in format.planes() {
            let stride = (spec.width(width) as usize)
                .checked_mul(spec.bytes_per_pixel)
                .ok_or_else(overflow)?;
            let rows = spec.height(height) as usize;
            let len = stride.checked_mul(rows).ok_or_else(overflow)?;
            planes.push(PlaneLayout {
                offset,
                stride,
                rows,
            });
            offset = offset.checked_add(len).ok_or_else(overflow)?;
        }

        Ok(Self {
            format,
            width,
            height,
            planes,
            size: offset,
        })
    }

    /// Total bytes required for the frame.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn planes(&self) -> &[PlaneLayout] {
        &self.planes
    }

    #[inline]
    pub fn plane(&self, index: usize) -> Option<&PlaneLayout> {
        self.planes.get(index)
    }

    #[inline]
    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }
}
