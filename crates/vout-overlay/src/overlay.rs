//! Overlay handle: one frame buffer, one lock, and the plane table the
//! render surface reads.
//!
//! Lifecycle:
//! - `Uninitialized` while the factory is running
//! - `Ready` once the buffer, plane table and lock exist
//! - `Destroyed` after [`Overlay::destroy`] or drop
//! - `Undefined` when the requested format is unknown; no buffer is ever
//!   allocated and destroy has nothing to release

use std::fmt;
use std::ptr;
use std::slice;

use parking_lot::{Mutex, MutexGuard};
use smallvec::SmallVec;
use tracing::{debug, error};
use vout_core::{catalog, CatalogEntry, FourCc, PixelFormat, PlaneLayout, Result, MAX_PLANES};

use crate::buffer::FrameBuffer;

/// Lifecycle state of an [`Overlay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Uninitialized,
    Ready,
    Undefined,
    Destroyed,
}

type TeardownHook = Box<dyn FnOnce() + Send + Sync>;

/// Uniform lifecycle contract over overlay implementations.
///
/// Callers that only render or only decode can be written against this
/// trait without knowing how the overlay was constructed.
pub trait VoutOverlay: Send + Sync {
    /// Proof of holding the overlay lock. Dropping it unlocks.
    type Guard<'a>
    where
        Self: 'a;

    fn format(&self) -> PixelFormat;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn plane_count(&self) -> usize;

    /// Block until the overlay lock is held.
    fn lock(&self) -> Self::Guard<'_>;

    /// Release a lock obtained from [`VoutOverlay::lock`].
    fn unlock<'a>(&'a self, guard: Self::Guard<'a>) {
        drop(guard);
    }

    /// Release owned resources. Calling it more than once is a no-op.
    fn destroy(&mut self);
}

/// A CPU overlay whose buffer is laid out for the decoder to write in place.
pub struct Overlay {
    format: PixelFormat,
    width: u32,
    height: u32,
    state: OverlayState,
    /// Plane table in display order.
    planes: SmallVec<[PlaneLayout; MAX_PLANES]>,
    pixels: [*mut u8; MAX_PLANES],
    pitches: [usize; MAX_PLANES],
    buffer: Option<FrameBuffer>,
    lock: Option<Mutex<()>>,
    teardown: Option<TeardownHook>,
}

// SAFETY: the raw plane pointers point into `buffer`, which the overlay owns
// and which is only released through `&mut self`. Byte access through the
// safe API requires holding `lock`.
unsafe impl Send for Overlay {}
unsafe impl Sync for Overlay {}

impl Overlay {
    /// Create an overlay for a display format given by FourCC.
    ///
    /// An unknown FourCC is not an error: the overlay comes back in the
    /// `Undefined` state with format [`PixelFormat::Undefined`] and no buffer.
    /// A failed allocation is an error and no overlay is returned.
    pub fn create(width: u32, height: u32, fourcc: FourCc) -> Result<Self> {
        debug!(width, height, %fourcc, "creating overlay");

        let mut overlay = Self {
            format: PixelFormat::from_fourcc(fourcc),
            width,
            height,
            state: OverlayState::Uninitialized,
            planes: SmallVec::new(),
            pixels: [ptr::null_mut(); MAX_PLANES],
            pitches: [0; MAX_PLANES],
            buffer: None,
            lock: None,
            teardown: None,
        };

        let Some(entry) = catalog::entry(overlay.format) else {
            error!(%fourcc, code = fourcc.0, "unknown overlay format");
            overlay.format = PixelFormat::Undefined;
            overlay.state = OverlayState::Undefined;
            return Ok(overlay);
        };

        if let Err(e) = overlay.init(entry) {
            error!(width, height, %fourcc, error = %e, "overlay allocation failed");
            overlay.destroy();
            return Err(e);
        }

        Ok(overlay)
    }

    /// Create an overlay for a known display format.
    pub fn with_format(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        Self::create(width, height, format.fourcc())
    }

    /// Register a hook run once at the end of [`Overlay::destroy`].
    pub fn with_teardown(mut self, hook: impl FnOnce() + Send + Sync + 'static) -> Self {
        self.teardown = Some(Box::new(hook));
        self
    }

    fn init(&mut self, entry: &CatalogEntry) -> Result<()> {
        let buffer = FrameBuffer::allocate(entry.canonical, self.width, self.height)?;

        let mut planes: SmallVec<[PlaneLayout; MAX_PLANES]> =
            buffer.layout().planes().iter().copied().collect();
        // Decoder order is Y, U, V; display order is Y, V, U
        if entry.swap_chroma {
            planes.swap(1, 2);
        }

        for (i, plane) in planes.iter().enumerate() {
            // SAFETY: plane offsets lie inside the allocation.
            self.pixels[i] = unsafe { buffer.as_ptr().add(plane.offset) };
            self.pitches[i] = plane.stride;
        }

        self.planes = planes;
        self.buffer = Some(buffer);
        self.lock = Some(Mutex::new(()));
        self.state = OverlayState::Ready;
        Ok(())
    }

    /// Release the buffer and the lock.
    ///
    /// Only a `Ready` overlay owns anything to release; in every other state
    /// this leaves resources untouched. The teardown hook runs on the first
    /// call regardless of state.
    pub fn destroy(&mut self) {
        if self.state == OverlayState::Ready {
            debug!(width = self.width, height = self.height, format = %self.format, "destroying overlay");
            self.pixels = [ptr::null_mut(); MAX_PLANES];
            self.pitches = [0; MAX_PLANES];
            self.planes.clear();
            self.buffer = None;
            self.lock = None;
            self.state = OverlayState::Destroyed;
        }

        if let Some(hook) = self.teardown.take() {
            hook();
        }
    }

    /// Block until the overlay lock is held.
    ///
    /// # Panics
    ///
    /// Panics unless the overlay is `Ready`; there is no buffer to guard.
    pub fn lock(&self) -> OverlayGuard<'_> {
        let lock = match (self.state, &self.lock) {
            (OverlayState::Ready, Some(lock)) => lock,
            (state, _) => panic!("lock called on {state:?} overlay ({})", self.format),
        };
        OverlayGuard {
            overlay: self,
            _guard: lock.lock(),
        }
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn state(&self) -> OverlayState {
        self.state
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state == OverlayState::Ready
    }

    #[inline]
    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    /// Bytes per row of each plane, in display order.
    #[inline]
    pub fn pitches(&self) -> &[usize] {
        &self.pitches[..self.plane_count()]
    }

    /// Base address of each plane, in display order.
    ///
    /// Writing through these pointers is only sound while holding the lock.
    #[inline]
    pub fn pixels(&self) -> &[*mut u8] {
        &self.pixels[..self.plane_count()]
    }

    /// Layout of a plane in display order.
    pub fn plane_layout(&self, index: usize) -> Option<&PlaneLayout> {
        self.planes.get(index)
    }

    /// Size of the backing allocation; zero when there is none.
    pub fn buffer_size(&self) -> usize {
        self.buffer.as_ref().map_or(0, FrameBuffer::size)
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    /// Whether `addr` points into this overlay's allocation.
    pub fn contains(&self, addr: *const u8) -> bool {
        self.buffer.as_ref().is_some_and(|b| b.contains(addr))
    }

    /// Natural-order plane address of the backing buffer.
    pub fn decoder_plane_ptr(&self, index: usize) -> Option<*mut u8> {
        self.buffer.as_ref()?.plane_ptr(index)
    }

    pub(crate) fn assert_ready(&self, op: &str) {
        assert!(
            self.state == OverlayState::Ready,
            "{op} called on {:?} overlay ({})",
            self.state,
            self.format
        );
    }
}

impl Drop for Overlay {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("state", &self.state)
            .field("pitches", &self.pitches())
            .field("buffer", &self.buffer)
            .finish()
    }
}

impl VoutOverlay for Overlay {
    type Guard<'a> = OverlayGuard<'a>;

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn plane_count(&self) -> usize {
        self.planes.len()
    }

    fn lock(&self) -> OverlayGuard<'_> {
        Overlay::lock(self)
    }

    fn destroy(&mut self) {
        Overlay::destroy(self);
    }
}

/// Exclusive access to an overlay's pixels. Unlocks on drop.
pub struct OverlayGuard<'a> {
    overlay: &'a Overlay,
    _guard: MutexGuard<'a, ()>,
}

impl<'a> OverlayGuard<'a> {
    #[inline]
    pub fn overlay(&self) -> &'a Overlay {
        self.overlay
    }

    #[inline]
    pub fn plane_count(&self) -> usize {
        self.overlay.plane_count()
    }

    #[inline]
    pub fn pitches(&self) -> &[usize] {
        self.overlay.pitches()
    }

    #[inline]
    pub fn pixels(&self) -> &[*mut u8] {
        self.overlay.pixels()
    }

    /// Bytes of a plane in display order.
    ///
    /// # Panics
    ///
    /// Panics if `index >= plane_count()`.
    pub fn plane(&self, index: usize) -> &[u8] {
        let layout = self.overlay.planes[index];
        // SAFETY: the plane lies inside the live allocation, and the lock we
        // hold excludes every other safe accessor.
        unsafe { slice::from_raw_parts(self.overlay.pixels[index], layout.len()) }
    }

    /// Mutable bytes of a plane in display order.
    ///
    /// # Panics
    ///
    /// Panics if `index >= plane_count()`.
    pub fn plane_mut(&mut self, index: usize) -> &mut [u8] {
        let layout = self.overlay.planes[index];
        // SAFETY: as in `plane`; `&mut self` keeps at most one mutable view alive.
        unsafe { slice::from_raw_parts_mut(self.overlay.pixels[index], layout.len()) }
    }

    /// One row of a plane, `stride` bytes long.
    #[inline]
    pub fn row(&self, plane: usize, y: usize) -> &[u8] {
        let stride = self.overlay.pitches[plane];
        &self.plane(plane)[y * stride..(y + 1) * stride]
    }

    /// One mutable row of a plane, `stride` bytes long.
    #[inline]
    pub fn row_mut(&mut self, plane: usize, y: usize) -> &mut [u8] {
        let stride = self.overlay.pitches[plane];
        &mut self.plane_mut(plane)[y * stride..(y + 1) * stride]
    }

    /// Release the lock.
    pub fn unlock(self) {}
}
