//! # Portable Fallback Counter
//!
//! Targets without a user-readable cycle counter get a process-wide tick
//! that advances by one per read. It keeps relative ordering but carries
//! no notion of elapsed time.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::arch::CounterFeatures;

static TICKS: AtomicU64 = AtomicU64::new(0);

/// Read (and advance) the fallback tick
#[inline]
pub fn read() -> u64 {
    TICKS.fetch_add(1, Ordering::Relaxed)
}

/// No hardware counter is used
pub fn detect_features() -> CounterFeatures {
    CounterFeatures {
        available: false,
        invariant: true,
        serializing_read: false,
        frequency_hz: None,
    }
}
