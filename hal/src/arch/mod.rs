//! # Architecture Counters
//!
//! Each supported architecture provides `read_counter()` (one instruction,
//! no syscall, no allocation) and `detect_features()`. Targets without a
//! user-readable counter fall back to a process-wide tick counter.

#[cfg(target_arch = "aarch64")]
pub mod aarch64;
#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub mod generic;
#[cfg(target_arch = "x86_64")]
pub mod x86_64;

// =============================================================================
// Counter Features
// =============================================================================

/// Capabilities of the cycle counter on the running CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterFeatures {
    /// A hardware counter is readable from the current privilege level
    pub available: bool,
    /// The counter ticks at a constant rate and is synchronized across cores
    pub invariant: bool,
    /// A self-serializing read (RDTSCP) is available
    pub serializing_read: bool,
    /// Tick rate, when the architecture reports one
    pub frequency_hz: Option<u64>,
}

cfg_if::cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        pub use self::x86_64::timers::tsc::{detect_features, read as read_counter};
    } else if #[cfg(target_arch = "aarch64")] {
        pub use self::aarch64::timers::counter::{detect_features, read as read_counter};
    } else {
        pub use self::generic::{detect_features, read as read_counter};
    }
}
