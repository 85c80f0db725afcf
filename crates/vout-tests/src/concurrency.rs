//! Producer/consumer stress tests on a shared overlay.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;

use vout_core::{DecoderPixelFormat, FourCc};
use vout_overlay::{bind, Overlay};

const ITERATIONS: u32 = 2000;

#[test]
fn locked_sessions_never_tear() {
    let overlay = Overlay::create(96, 64, FourCc::YV12).unwrap();
    let done = AtomicBool::new(false);
    let reads = AtomicU32::new(0);

    thread::scope(|s| {
        s.spawn(|| {
            for session in 1..=ITERATIONS {
                let mut guard = overlay.lock();
                let byte = session as u8;
                for plane in 0..guard.plane_count() {
                    // Write row by row so a concurrent reader would catch a half-written frame
                    let rows = overlay.plane_layout(plane).unwrap().rows;
                    for y in 0..rows {
                        guard.row_mut(plane, y).fill(byte);
                    }
                }
                guard.unlock();
                thread::yield_now();
            }
            done.store(true, Ordering::Release);
        });

        s.spawn(|| {
            while !done.load(Ordering::Acquire) {
                let guard = overlay.lock();
                let first = guard.plane(0)[0];
                for plane in 0..guard.plane_count() {
                    assert!(
                        guard.plane(plane).iter().all(|&b| b == first),
                        "torn read in plane {plane}"
                    );
                }
                guard.unlock();
                reads.fetch_add(1, Ordering::Relaxed);
                thread::yield_now();
            }
        });
    });

    assert!(reads.load(Ordering::Relaxed) > 0);
    let guard = overlay.lock();
    assert!(guard.plane(2).iter().all(|&b| b == ITERATIONS as u8));
}

#[test]
fn descriptor_writes_under_lock_never_tear() {
    let overlay = Overlay::create(64, 32, FourCc::RV32).unwrap();
    let done = AtomicBool::new(false);
    let reads = AtomicU32::new(0);

    thread::scope(|s| {
        s.spawn(|| {
            let desc = bind(&overlay, DecoderPixelFormat::Zbgr32).unwrap();
            let stride = desc.linesize()[0];
            let rows = overlay.plane_layout(0).unwrap().rows;
            for session in 1..=ITERATIONS {
                let row = vec![session as u8; stride];
                let mut guard = overlay.lock();
                for y in 0..rows {
                    desc.write_row(&mut guard, 0, y, &row);
                }
                guard.unlock();
                thread::yield_now();
            }
            done.store(true, Ordering::Release);
        });

        s.spawn(|| {
            while !done.load(Ordering::Acquire) {
                let guard = overlay.lock();
                let plane = guard.plane(0);
                let first = plane[0];
                assert!(plane.iter().all(|&b| b == first), "torn read");
                guard.unlock();
                reads.fetch_add(1, Ordering::Relaxed);
                thread::yield_now();
            }
        });
    });

    assert!(reads.load(Ordering::Relaxed) > 0);
    let guard = overlay.lock();
    assert!(guard.plane(0).iter().all(|&b| b == ITERATIONS as u8));
}
