//! Mapping between display-side and decoder-side pixel formats.
//!
//! The catalog is a static table. Lookups are pure and never fail loudly:
//! an unknown display format maps to `None`, an unknown pairing to `false`.

use crate::format::{DecoderPixelFormat, PixelFormat};

/// One display format and the decoder formats that can fill it.
#[derive(Debug)]
pub struct CatalogEntry {
    pub display: PixelFormat,
    /// Format used to size the buffer and compute its natural plane layout.
    pub canonical: DecoderPixelFormat,
    /// Format a decoder should be asked to produce for this display.
    pub preferred: DecoderPixelFormat,
    /// Every decoder format allowed to write into a buffer of this display format.
    pub compatible: &'static [DecoderPixelFormat],
    /// Whether display planes 1 and 2 are swapped relative to `canonical`.
    pub swap_chroma: bool,
}

static CATALOG: [CatalogEntry; 3] = [
    CatalogEntry {
        display: PixelFormat::PlanarYuv420,
        canonical: DecoderPixelFormat::Yuv420p,
        preferred: DecoderPixelFormat::Yuv420p,
        compatible: &[DecoderPixelFormat::Yuv420p],
        swap_chroma: true,
    },
    CatalogEntry {
        display: PixelFormat::Rgb565,
        canonical: DecoderPixelFormat::Rgb565,
        preferred: DecoderPixelFormat::Rgb565,
        compatible: &[DecoderPixelFormat::Rgb565, DecoderPixelFormat::Bgr565],
        swap_chroma: false,
    },
    CatalogEntry {
        display: PixelFormat::Rgb32,
        canonical: DecoderPixelFormat::Rgb32,
        // Android surfaces expect RGBX byte order
        preferred: DecoderPixelFormat::Zbgr32,
        compatible: &[
            DecoderPixelFormat::Rgb32,
            DecoderPixelFormat::Bgr32,
            DecoderPixelFormat::Zbgr32,
            DecoderPixelFormat::Zrgb32,
        ],
        swap_chroma: false,
    },
];

/// Look up the catalog entry for a display format.
pub fn entry(display: PixelFormat) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.display == display)
}

/// All catalog entries.
pub fn entries() -> &'static [CatalogEntry] {
    &CATALOG
}

/// Decoder format used to size and fill a buffer for `display`.
pub fn decoder_format_for(display: PixelFormat) -> Option<DecoderPixelFormat> {
    entry(display).map(|e| e.canonical)
}

/// Decoder format a decoder should be configured to output for `display`.
pub fn best_decoder_format(display: PixelFormat) -> Option<DecoderPixelFormat> {
    entry(display).map(|e| e.preferred)
}

/// Whether a decoder writing `decoder` may target a buffer allocated for `display`.
pub fn is_compatible(decoder: DecoderPixelFormat, display: PixelFormat) -> bool {
    entry(display).is_some_and(|e| e.compatible.contains(&decoder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use DecoderPixelFormat as D;

    #[test]
    fn test_decoder_format_for() {
        assert_eq!(
            decoder_format_for(PixelFormat::PlanarYuv420),
            Some(D::Yuv420p)
        );
        assert_eq!(decoder_format_for(PixelFormat::Rgb565), Some(D::Rgb565));
        assert_eq!(decoder_format_for(PixelFormat::Rgb32), Some(D::Rgb32));
        assert_eq!(decoder_format_for(PixelFormat::Undefined), None);
    }

    #[test]
    fn test_best_decoder_format() {
        assert_eq!(best_decoder_format(PixelFormat::Rgb32), Some(D::Zbgr32));
        assert_eq!(best_decoder_format(PixelFormat::Undefined), None);
    }

    #[test]
    fn test_compatibility_table() {
        let expected: &[(PixelFormat, &[D])] = &[
            (PixelFormat::PlanarYuv420, &[D::Yuv420p]),
            (PixelFormat::Rgb565, &[D::Rgb565, D::Bgr565]),
            (
                PixelFormat::Rgb32,
                &[D::Rgb32, D::Bgr32, D::Zbgr32, D::Zrgb32],
            ),
            (PixelFormat::Undefined, &[]),
        ];

        for (display, allowed) in expected {
            for decoder in D::ALL {
                assert_eq!(
                    is_compatible(decoder, *display),
                    allowed.contains(&decoder),
                    "{decoder} vs {display}"
                );
            }
        }
    }

    #[test]
    fn test_entries_are_self_consistent() {
        for e in entries() {
            assert!(e.compatible.contains(&e.canonical));
            assert!(e.compatible.contains(&e.preferred));
            // Every compatible format must share the canonical plane geometry
            for d in e.compatible {
                assert_eq!(d.planes(), e.canonical.planes());
            }
            assert_eq!(e.canonical.plane_count(), e.display.plane_count());
            assert_eq!(e.swap_chroma, e.display.plane_count() == 3);
        }
    }
}
