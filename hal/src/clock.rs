//! # Cycle Clock
//!
//! A cheap, per-core monotonic counter used to order trace events.
//!
//! Readings are only meaningful relative to each other on one core: they
//! are not wall-clock time, and unless [`PlatformClock::is_invariant`]
//! holds they must not be compared across cores.
//!
//! [`FakeClock`] is a deterministic stand-in that returns consecutive
//! values, for tests that need predictable timestamps.

use core::sync::atomic::{AtomicU64, Ordering};

use spin::Once;

use crate::arch::{self, CounterFeatures};

// =============================================================================
// Clock Trait
// =============================================================================

/// Source of 64-bit timestamps for trace records
pub trait CycleClock: Send + Sync {
    /// Read the counter. Never blocks, never allocates.
    fn now(&self) -> u64;
}

impl<C: CycleClock + ?Sized> CycleClock for &C {
    #[inline(always)]
    fn now(&self) -> u64 {
        (**self).now()
    }
}

// =============================================================================
// Platform Clock
// =============================================================================

static FEATURES: Once<CounterFeatures> = Once::new();

/// The hardware cycle counter of the target architecture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformClock;

impl PlatformClock {
    /// Create a handle to the hardware counter
    pub const fn new() -> Self {
        Self
    }

    /// Counter features, detected once per process
    pub fn features() -> CounterFeatures {
        *FEATURES.call_once(|| {
            let features = arch::detect_features();
            log::debug!(
                "Clock: counter available={} invariant={} serializing={}",
                features.available,
                features.invariant,
                features.serializing_read
            );
            if let Some(hz) = features.frequency_hz {
                log::debug!("Clock: counter ticks at {} Hz", hz);
            }
            features
        })
    }

    /// Can readings taken on different cores be compared?
    pub fn is_invariant() -> bool {
        Self::features().invariant
    }
}

impl CycleClock for PlatformClock {
    #[inline(always)]
    fn now(&self) -> u64 {
        arch::read_counter()
    }
}

// =============================================================================
// Fake Clock
// =============================================================================

/// Deterministic clock: every read returns the previous value plus `step`
#[derive(Debug)]
pub struct FakeClock {
    next: AtomicU64,
    step: u64,
}

impl FakeClock {
    /// Clock whose first reading is 0
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Clock whose first reading is `origin`
    pub const fn starting_at(origin: u64) -> Self {
        Self::with_step(origin, 1)
    }

    /// Clock starting at `origin` that advances by `step` per read
    pub const fn with_step(origin: u64, step: u64) -> Self {
        Self {
            next: AtomicU64::new(origin),
            step,
        }
    }

    /// Value the next read will return
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleClock for FakeClock {
    #[inline]
    fn now(&self) -> u64 {
        self.next.fetch_add(self.step, Ordering::Relaxed)
    }
}
