//! Contiguous pixel allocation backing one overlay.
//!
//! The allocation is held as a raw pointer so that plane pointers handed to
//! decoders and the slices handed out under the overlay lock all derive from
//! the same base. It never moves and is never resized.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use vout_core::{DecoderPixelFormat, FrameLayout, Result, VoutError};

/// One frame's worth of pixel memory, sized for a decoder format.
pub struct FrameBuffer {
    ptr: NonNull<u8>,
    layout: FrameLayout,
}

// SAFETY: FrameBuffer uniquely owns its allocation. Concurrent access to the
// bytes is mediated by the owning overlay's lock.
unsafe impl Send for FrameBuffer {}
unsafe impl Sync for FrameBuffer {}

impl FrameBuffer {
    /// Allocate a zeroed buffer for `format` at the given dimensions.
    ///
    /// Fails if either dimension is zero or the allocation cannot be satisfied.
    pub fn allocate(format: DecoderPixelFormat, width: u32, height: u32) -> Result<Self> {
        let layout = FrameLayout::compute(format, width, height)?;
        let size = layout.size();

        let alloc_layout = Self::alloc_layout(size)?;

        // SAFETY: `size` is non-zero, since zero dimensions were rejected above.
        let raw = unsafe { alloc::alloc_zeroed(alloc_layout) };
        let ptr = NonNull::new(raw).ok_or(VoutError::AllocationFailed { bytes: size })?;

        Ok(Self { ptr, layout })
    }

    fn alloc_layout(size: usize) -> Result<Layout> {
        Layout::array::<u8>(size).map_err(|_| VoutError::AllocationFailed { bytes: size })
    }

    /// Base address of the allocation.
    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Size of the allocation in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    /// Natural plane layout of the allocation.
    #[inline]
    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Address of the first byte of a plane, in natural plane order.
    pub fn plane_ptr(&self, index: usize) -> Option<*mut u8> {
        let plane = self.layout.plane(index)?;
        // SAFETY: every plane offset is below `size` by construction of the layout.
        Some(unsafe { self.as_ptr().add(plane.offset) })
    }

    /// Whether `addr` falls inside the allocation.
    pub fn contains(&self, addr: *const u8) -> bool {
        let base = self.as_ptr() as usize;
        let addr = addr as usize;
        addr >= base && addr < base + self.size()
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        // The layout was valid when allocating, so it still is.
        if let Ok(layout) = Self::alloc_layout(self.size()) {
            // SAFETY: ptr came from alloc_zeroed with this exact layout, and
            // Drop runs once.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("ptr", &self.ptr)
            .field("size", &self.size())
            .field("format", &self.layout.format)
            .finish()
    }
}
