//! Zero-copy picture descriptors for decoders.
//!
//! A decoder asks for a descriptor in its own pixel format and gets back the
//! overlay's plane pointers and strides verbatim, so it can write decoded
//! rows straight into the overlay buffer.

use std::ptr;

use tracing::error;
use vout_core::{catalog, DecoderPixelFormat, Result, VoutError, MAX_PLANES};

use crate::overlay::{Overlay, OverlayGuard};

/// Plane pointers and strides aimed at an overlay's buffer.
///
/// Borrows the overlay, so the buffer cannot be destroyed while a
/// descriptor is alive. Holding a descriptor does not hold the lock.
#[derive(Debug, Clone, Copy)]
pub struct PictureDescriptor<'a> {
    overlay: &'a Overlay,
    format: DecoderPixelFormat,
    data: [*mut u8; MAX_PLANES],
    linesize: [usize; MAX_PLANES],
    planes: usize,
}

impl<'a> PictureDescriptor<'a> {
    /// Decoder format this descriptor was bound for.
    #[inline]
    pub fn format(&self) -> DecoderPixelFormat {
        self.format
    }

    #[inline]
    pub fn plane_count(&self) -> usize {
        self.planes
    }

    /// Plane base pointers, in overlay display order.
    #[inline]
    pub fn data(&self) -> &[*mut u8] {
        &self.data[..self.planes]
    }

    /// Bytes per row of each plane.
    #[inline]
    pub fn linesize(&self) -> &[usize] {
        &self.linesize[..self.planes]
    }

    /// Copy one decoded row into a plane.
    ///
    /// The exclusive borrow of `guard` proves the lock is held and that no
    /// slice handed out by the guard is alive during the write.
    ///
    /// # Panics
    ///
    /// Panics if `guard` locks a different overlay, `plane` is not below
    /// [`plane_count`](Self::plane_count), `y` is past the plane's last row,
    /// or `src` is longer than the plane's stride.
    pub fn write_row(&self, guard: &mut OverlayGuard<'_>, plane: usize, y: usize, src: &[u8]) {
        assert!(
            ptr::eq(guard.overlay(), self.overlay),
            "write_row with a guard of another overlay"
        );
        assert!(plane < self.planes, "plane {plane} out of {}", self.planes);
        let rows = self.overlay.plane_layout(plane).map_or(0, |l| l.rows);
        assert!(y < rows, "row {y} out of {rows} in plane {plane}");
        let stride = self.linesize[plane];
        assert!(
            src.len() <= stride,
            "row of {} bytes exceeds stride {stride}",
            src.len()
        );
        // SAFETY: plane, row and length are bounds-checked against the
        // overlay's layout, and the guard borrow excludes every other view.
        unsafe {
            let dst = self.data[plane].add(y * stride);
            ptr::copy_nonoverlapping(src.as_ptr(), dst, src.len());
        }
    }
}

/// Bind a decoder-side descriptor to an overlay's buffer.
///
/// Returns [`VoutError::Incompatible`] when `format` cannot fill a buffer of
/// the overlay's display format. Does not lock the overlay.
///
/// # Panics
///
/// Panics unless the overlay is `Ready`.
pub fn bind(overlay: &Overlay, format: DecoderPixelFormat) -> Result<PictureDescriptor<'_>> {
    overlay.assert_ready("bind");

    let target = overlay.format();
    if !catalog::is_compatible(format, target) {
        error!(
            decoder = format.name(),
            display = %target,
            code = target.fourcc().0,
            "unexpected decoder format for overlay"
        );
        return Err(VoutError::Incompatible {
            decoder: format,
            display: target,
        });
    }

    let mut data = [ptr::null_mut(); MAX_PLANES];
    let mut linesize = [0; MAX_PLANES];
    let planes = overlay.plane_count();
    data[..planes].copy_from_slice(overlay.pixels());
    linesize[..planes].copy_from_slice(overlay.pitches());

    Ok(PictureDescriptor {
        overlay,
        format,
        data,
        linesize,
        planes,
    })
}
