//! Pixel format identifiers for both sides of the overlay.
//!
//! Display-side formats are what the render surface understands and are
//! addressed by FourCC codes. Decoder-side formats are what the decoding
//! pipeline writes natively. The [`crate::catalog`] module maps between them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::VoutError;

/// A four-character code identifying a display pixel format.
///
/// Packed little-endian, first character in the lowest byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FourCc(pub u32);

impl FourCc {
    /// Planar YUV 4:2:0 with chroma planes in V, U order.
    pub const YV12: Self = Self::from_bytes(*b"YV12");
    /// 16-bit RGB 5:6:5.
    pub const RV16: Self = Self::from_bytes(*b"RV16");
    /// 32-bit RGB.
    pub const RV32: Self = Self::from_bytes(*b"RV32");
    /// Marker for an overlay without a usable format.
    pub const UNDF: Self = Self::from_bytes(*b"UNDF");

    /// Pack four characters into a code.
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(b))
    }

    /// The four characters of this code.
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Whether all four characters print as themselves.
    pub fn is_printable(self) -> bool {
        self.to_bytes()
            .iter()
            .all(|&b| b.is_ascii_graphic() || b == b' ')
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.to_bytes() {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Printable codes serialize as their characters, others as `0x` + 8 hex digits.
impl From<FourCc> for String {
    fn from(code: FourCc) -> Self {
        if code.is_printable() {
            code.to_string()
        } else {
            format!("{:#010x}", code.0)
        }
    }
}

impl TryFrom<String> for FourCc {
    type Error = VoutError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if let Some(hex) = s.strip_prefix("0x") {
            if hex.len() == 8 {
                return u32::from_str_radix(hex, 16)
                    .map(Self)
                    .map_err(|e| VoutError::Config(format!("bad FourCC value {s:?}: {e}")));
            }
        }
        let bytes: [u8; 4] = s
            .as_bytes()
            .try_into()
            .map_err(|_| VoutError::Config(format!("FourCC must be 4 bytes, got {s:?}")))?;
        if !bytes.is_ascii() {
            return Err(VoutError::Config(format!("FourCC must be ASCII, got {s:?}")));
        }
        Ok(Self::from_bytes(bytes))
    }
}

/// Display-side pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, planes ordered Y, V, U
    #[serde(rename = "YV12")]
    PlanarYuv420,
    /// Packed 16-bit RGB 5:6:5
    #[serde(rename = "RV16")]
    Rgb565,
    /// Packed 32-bit RGB
    #[serde(rename = "RV32")]
    Rgb32,
    /// No usable format
    #[default]
    #[serde(rename = "UNDF")]
    Undefined,
}

impl PixelFormat {
    /// Resolve a FourCC. Unknown codes resolve to [`PixelFormat::Undefined`].
    pub fn from_fourcc(code: FourCc) -> Self {
        match code {
            FourCc::YV12 => Self::PlanarYuv420,
            FourCc::RV16 => Self::Rgb565,
            FourCc::RV32 => Self::Rgb32,
            _ => Self::Undefined,
        }
    }

    /// The FourCC for this format.
    pub fn fourcc(self) -> FourCc {
        match self {
            Self::PlanarYuv420 => FourCc::YV12,
            Self::Rgb565 => FourCc::RV16,
            Self::Rgb32 => FourCc::RV32,
            Self::Undefined => FourCc::UNDF,
        }
    }

    /// Number of planes an overlay of this format exposes.
    pub fn plane_count(self) -> usize {
        match self {
            Self::PlanarYuv420 => 3,
            Self::Rgb565 | Self::Rgb32 => 1,
            Self::Undefined => 0,
        }
    }

    pub fn is_defined(self) -> bool {
        self != Self::Undefined
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.fourcc(), f)
    }
}

/// Decoder-side pixel format.
///
/// The 32-bit RGB variants follow the decoder library's native-endian
/// aliases, so the same variant names a different byte order on big-endian
/// targets. See [`DecoderPixelFormat::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecoderPixelFormat {
    /// Planar YUV 4:2:0, planes ordered Y, U, V
    #[serde(rename = "yuv420p")]
    Yuv420p,
    /// Semi-planar YUV 4:2:0 (Y plane + interleaved UV)
    #[serde(rename = "nv12")]
    Nv12,
    /// Packed RGB, 24bpp
    #[serde(rename = "rgb24")]
    Rgb24,
    /// Packed ARGB in native-endian 32-bit words
    #[serde(rename = "rgb32")]
    Rgb32,
    /// Packed ABGR in native-endian 32-bit words
    #[serde(rename = "bgr32")]
    Bgr32,
    /// Packed xBGR in native-endian 32-bit words
    #[serde(rename = "0bgr32")]
    Zbgr32,
    /// Packed xRGB in native-endian 32-bit words
    #[serde(rename = "0rgb32")]
    Zrgb32,
    /// Packed RGB 5:6:5, native-endian
    #[serde(rename = "rgb565")]
    Rgb565,
    /// Packed BGR 5:6:5, native-endian
    #[serde(rename = "bgr565")]
    Bgr565,
}

impl DecoderPixelFormat {
    pub const ALL: [Self; 9] = [
        Self::Yuv420p,
        Self::Nv12,
        Self::Rgb24,
        Self::Rgb32,
        Self::Bgr32,
        Self::Zbgr32,
        Self::Zrgb32,
        Self::Rgb565,
        Self::Bgr565,
    ];

    /// Decoder library name of the concrete byte layout on this target.
    pub fn name(self) -> &'static str {
        let le = cfg!(target_endian = "little");
        match self {
            Self::Yuv420p => "yuv420p",
            Self::Nv12 => "nv12",
            Self::Rgb24 => "rgb24",
            Self::Rgb32 => {
                if le {
                    "bgra"
                } else {
                    "argb"
                }
            }
            Self::Bgr32 => {
                if le {
                    "rgba"
                } else {
                    "abgr"
                }
            }
            Self::Zbgr32 => {
                if le {
                    "rgb0"
                } else {
                    "0bgr"
                }
            }
            Self::Zrgb32 => {
                if le {
                    "bgr0"
                } else {
                    "0rgb"
                }
            }
            Self::Rgb565 => {
                if le {
                    "rgb565le"
                } else {
                    "rgb565be"
                }
            }
            Self::Bgr565 => {
                if le {
                    "bgr565le"
                } else {
                    "bgr565be"
                }
            }
        }
    }

    /// Number of data planes in this format.
    pub fn plane_count(self) -> usize {
        self.planes().len()
    }

    /// Per-plane sample geometry, in the decoder's native plane order.
    pub fn planes(self) -> &'static [PlaneSpec] {
        const LUMA: PlaneSpec = PlaneSpec::full(1);
        const CHROMA: PlaneSpec = PlaneSpec::subsampled(1, 1, 1);
        const CHROMA_PAIR: PlaneSpec = PlaneSpec::subsampled(2, 1, 1);
        const PACKED_16: PlaneSpec = PlaneSpec::full(2);
        const PACKED_24: PlaneSpec = PlaneSpec::full(3);
        const PACKED_32: PlaneSpec = PlaneSpec::full(4);
        match self {
            Self::Yuv420p => &[LUMA, CHROMA, CHROMA],
            Self::Nv12 => &[LUMA, CHROMA_PAIR],
            Self::Rgb24 => &[PACKED_24],
            Self::Rgb32 | Self::Bgr32 | Self::Zbgr32 | Self::Zrgb32 => &[PACKED_32],
            Self::Rgb565 | Self::Bgr565 => &[PACKED_16],
        }
    }
}

impl fmt::Display for DecoderPixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sample geometry of one plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneSpec {
    /// Bytes per sample position in this plane
    pub bytes_per_pixel: usize,
    /// Horizontal subsampling as a right shift of the frame width
    pub log2_w: u32,
    /// Vertical subsampling as a right shift of the frame height
    pub log2_h: u32,
}

impl PlaneSpec {
    const fn full(bytes_per_pixel: usize) -> Self {
        Self::subsampled(bytes_per_pixel, 0, 0)
    }

    const fn subsampled(bytes_per_pixel: usize, log2_w: u32, log2_h: u32) -> Self {
        Self {
            bytes_per_pixel,
            log2_w,
            log2_h,
        }
    }

    /// Plane width in samples for a frame width, rounding up.
    pub fn width(&self, frame_width: u32) -> u32 {
        ceil_rshift(frame_width, self.log2_w)
    }

    /// Plane height in rows for a frame height, rounding up.
    pub fn height(&self, frame_height: u32) -> u32 {
        ceil_rshift(frame_height, self.log2_h)
    }
}

#[inline]
fn ceil_rshift(v: u32, shift: u32) -> u32 {
    ((v as u64 + (1u64 << shift) - 1) >> shift) as u32
}
