//! Integration tests for overlay construction and teardown.

use vout_core::{decoder_format_for, FourCc, FrameLayout, PixelFormat};
use vout_overlay::{Overlay, OverlayConfig, OverlayState};

#[test]
fn yv12_640x480_has_three_planes_with_half_size_chroma() {
    let overlay = Overlay::create(640, 480, FourCc::YV12).unwrap();
    assert_eq!(overlay.plane_count(), 3);

    let pitches = overlay.pitches();
    assert!(pitches[0] >= 640);
    assert!(pitches[1] >= 320);
    assert!(pitches[2] >= 320);

    for chroma in 1..3 {
        let layout = overlay.plane_layout(chroma).unwrap();
        assert_eq!(layout.stride, 320);
        assert_eq!(layout.rows, 240);
    }
}

#[test]
fn rv16_320x240_single_plane() {
    let overlay = Overlay::create(320, 240, FourCc::RV16).unwrap();
    assert_eq!(overlay.plane_count(), 1);
    let stride = overlay.pitches()[0];
    assert!(stride >= 320 * 2);
    assert!(overlay.buffer_size() >= stride * 240);
}

#[test]
fn buffer_size_matches_unpadded_layout() {
    for format in [PixelFormat::PlanarYuv420, PixelFormat::Rgb565, PixelFormat::Rgb32] {
        let overlay = Overlay::with_format(123, 77, format).unwrap();
        let decoder = decoder_format_for(format).unwrap();
        let layout = FrameLayout::compute(decoder, 123, 77).unwrap();
        assert_eq!(overlay.buffer_size(), layout.size(), "{format}");
    }
}

#[test]
fn chroma_plane_one_of_decoder_ends_up_at_index_two() {
    let overlay = Overlay::create(176, 144, FourCc::YV12).unwrap();
    let native_u = overlay.decoder_plane_ptr(1).unwrap();
    let native_v = overlay.decoder_plane_ptr(2).unwrap();
    assert_eq!(overlay.pixels()[2], native_u);
    assert_eq!(overlay.pixels()[1], native_v);
}

#[test]
fn rgb_overlays_keep_natural_plane_order() {
    for code in [FourCc::RV16, FourCc::RV32] {
        let overlay = Overlay::create(50, 50, code).unwrap();
        assert_eq!(overlay.pixels()[0], overlay.decoder_plane_ptr(0).unwrap());
    }
}

#[test]
fn unknown_format_never_allocates() {
    for code in [FourCc::UNDF, FourCc::from_bytes(*b"YUY2"), FourCc(0)] {
        let overlay = Overlay::create(1920, 1080, code).unwrap();
        assert_eq!(overlay.format(), PixelFormat::Undefined);
        assert_eq!(overlay.state(), OverlayState::Undefined);
        assert!(!overlay.has_buffer());
    }
}

#[test]
fn destroy_twice_then_drop() {
    let mut overlay = OverlayConfig::hd_rv32().create().unwrap();
    overlay.destroy();
    overlay.destroy();
    assert_eq!(overlay.state(), OverlayState::Destroyed);
    assert_eq!(overlay.buffer_size(), 0);
    drop(overlay);
}

#[test]
fn overlays_never_share_buffers() {
    let a = Overlay::create(32, 32, FourCc::RV32).unwrap();
    let b = Overlay::create(32, 32, FourCc::RV32).unwrap();
    assert!(!a.contains(b.pixels()[0]));
    assert!(!b.contains(a.pixels()[0]));
}
