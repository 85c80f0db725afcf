//! Integration tests for decoder descriptor binding.

use vout_core::{best_decoder_format, is_compatible, DecoderPixelFormat, FourCc, VoutError};
use vout_overlay::{bind, Overlay};

#[test]
fn bind_rv32_with_bgr32_returns_overlay_pointer() {
    let overlay = Overlay::create(640, 360, FourCc::RV32).unwrap();
    let desc = bind(&overlay, DecoderPixelFormat::Bgr32).unwrap();
    assert_eq!(desc.plane_count(), 1);
    assert_eq!(desc.data()[0], overlay.pixels()[0]);
}

#[test]
fn bind_rv16_with_yuv420p_is_incompatible() {
    let overlay = Overlay::create(320, 240, FourCc::RV16).unwrap();
    let err = bind(&overlay, DecoderPixelFormat::Yuv420p).unwrap_err();
    assert!(matches!(err, VoutError::Incompatible { .. }));
}

#[test]
fn bind_agrees_with_catalog() {
    for code in [FourCc::YV12, FourCc::RV16, FourCc::RV32] {
        let overlay = Overlay::create(48, 30, code).unwrap();
        for decoder in DecoderPixelFormat::ALL {
            match bind(&overlay, decoder) {
                Ok(desc) => {
                    assert!(is_compatible(decoder, overlay.format()));
                    assert_eq!(desc.data(), overlay.pixels());
                    assert_eq!(desc.linesize(), overlay.pitches());
                }
                Err(_) => assert!(!is_compatible(decoder, overlay.format())),
            }
        }
    }
}

#[test]
fn best_decoder_format_always_binds() {
    for code in [FourCc::YV12, FourCc::RV16, FourCc::RV32] {
        let overlay = Overlay::create(16, 16, code).unwrap();
        let best = best_decoder_format(overlay.format()).unwrap();
        assert!(bind(&overlay, best).is_ok());
    }
}

#[test]
fn decoder_writes_u_plane_and_renderer_sees_it_at_index_two() {
    let overlay = Overlay::create(8, 4, FourCc::YV12).unwrap();
    let desc = bind(&overlay, DecoderPixelFormat::Yuv420p).unwrap();

    // Decoder fills its native planes: Y, then U, then V
    let native_u = overlay.decoder_plane_ptr(1).unwrap();
    {
        let _guard = overlay.lock();
        unsafe {
            std::ptr::write_bytes(overlay.decoder_plane_ptr(0).unwrap(), 16, 32);
            std::ptr::write_bytes(native_u, 90, 8);
            std::ptr::write_bytes(overlay.decoder_plane_ptr(2).unwrap(), 240, 8);
        }
    }
    assert_eq!(desc.data()[2], native_u);

    let guard = overlay.lock();
    assert!(guard.plane(0).iter().all(|&b| b == 16));
    assert!(guard.plane(1).iter().all(|&b| b == 240));
    assert!(guard.plane(2).iter().all(|&b| b == 90));
}

#[test]
#[should_panic(expected = "bind called on Destroyed overlay")]
fn bind_after_destroy_panics() {
    let mut overlay = Overlay::create(8, 8, FourCc::RV32).unwrap();
    overlay.destroy();
    let _ = bind(&overlay, DecoderPixelFormat::Rgb32);
}
