//! # Generic Timer Virtual Counter
//!
//! `CNTVCT_EL0` is a 64-bit count at the system counter frequency
//! (`CNTFRQ_EL0`), readable from EL0 and synchronized across cores.

use crate::arch::CounterFeatures;

/// Read the virtual count
#[inline(always)]
pub fn read() -> u64 {
    let count: u64;
    unsafe {
        core::arch::asm!(
            "mrs {}, cntvct_el0",
            out(reg) count,
            options(nostack, nomem, preserves_flags),
        );
    }
    count
}

/// Read the counter frequency in Hz
#[inline]
pub fn frequency() -> u64 {
    let freq: u64;
    unsafe {
        core::arch::asm!(
            "mrs {}, cntfrq_el0",
            out(reg) freq,
            options(nostack, nomem, preserves_flags),
        );
    }
    freq
}

/// The generic timer is architecturally mandatory on ARMv8-A
pub fn detect_features() -> CounterFeatures {
    CounterFeatures {
        available: true,
        invariant: true,
        serializing_read: false,
        frequency_hz: Some(frequency()),
    }
}
