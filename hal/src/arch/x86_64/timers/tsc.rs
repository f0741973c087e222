//! # Time Stamp Counter (TSC)
//!
//! The TSC is a 64-bit register present on all x86_64 processors that
//! counts processor cycles. `RDTSC` is unprivileged unless the OS sets
//! CR4.TSD, so it serves as the queue tracer's cycle clock.
//!
//! ## TSC Variants
//!
//! 1. **Non-invariant TSC** (older CPUs)
//!    - Frequency changes with CPU frequency
//!    - Readings from different cores must not be compared
//!
//! 2. **Invariant TSC** (modern CPUs)
//!    - Constant rate at all ACPI P/C states
//!    - Synchronized across all cores
//!
//! Trace records only rely on ordering between readings on one core, so
//! both variants are usable.

use core::arch::x86_64::__cpuid;

use crate::arch::CounterFeatures;

// =============================================================================
// Constants
// =============================================================================

/// CPUID leaf for the highest extended function
const CPUID_EXT_MAX: u32 = 0x8000_0000;

/// CPUID leaf with the RDTSCP bit
const CPUID_EXT_FEATURES: u32 = 0x8000_0001;

/// CPUID leaf with the invariant TSC bit
const CPUID_EXT_POWER: u32 = 0x8000_0007;

// =============================================================================
// CPUID Helpers
// =============================================================================

// `__cpuid` preserves RBX around the instruction, which inline asm cannot
// name as an operand.
fn cpuid(leaf: u32) -> (u32, u32, u32, u32) {
    #[allow(unused_unsafe)]
    let r = unsafe { __cpuid(leaf) };
    (r.eax, r.ebx, r.ecx, r.edx)
}

fn cpuid_max_extended() -> u32 {
    let (eax, _, _, _) = cpuid(CPUID_EXT_MAX);
    eax
}

// =============================================================================
// Feature Detection
// =============================================================================

/// Detect TSC features from CPUID
pub fn detect_features() -> CounterFeatures {
    let mut features = CounterFeatures::default();

    // CPUID.01H:EDX.TSC[bit 4]
    let (_, _, _, edx) = cpuid(1);
    features.available = edx & (1 << 4) != 0;

    if !features.available {
        return features;
    }

    let max_ext = cpuid_max_extended();

    // CPUID.80000001H:EDX[bit 27]
    if max_ext >= CPUID_EXT_FEATURES {
        let (_, _, _, edx) = cpuid(CPUID_EXT_FEATURES);
        features.serializing_read = edx & (1 << 27) != 0;
    }

    // CPUID.80000007H:EDX[bit 8]
    if max_ext >= CPUID_EXT_POWER {
        let (_, _, _, edx) = cpuid(CPUID_EXT_POWER);
        features.invariant = edx & (1 << 8) != 0;
    }

    features
}

// =============================================================================
// TSC Reading
// =============================================================================

/// Read the Time Stamp Counter
#[inline(always)]
pub fn read() -> u64 {
    let low: u32;
    let high: u32;
    unsafe {
        core::arch::asm!(
            "rdtsc",
            out("eax") low,
            out("edx") high,
            options(nostack, nomem, preserves_flags),
        );
    }
    ((high as u64) << 32) | (low as u64)
}
