//! Spin episode de-duplication
//!
//! A producer polling a full queue (or a consumer polling an empty one)
//! would flood the ring with one event per poll. The tracker keeps one
//! flag per end and reports only the first observation of each episode.
//!
//! Each flag has exactly one writer: the enqueue side owns `full`, the
//! dequeue side owns `empty`. The flags are accessed with relaxed loads
//! and stores only; nothing here synchronizes the two ends.

use core::sync::atomic::{AtomicBool, Ordering};

/// Per-queue spin flags
#[derive(Debug, Default)]
pub struct SpinStateTracker {
    full_spinning: AtomicBool,
    empty_spinning: AtomicBool,
}

impl SpinStateTracker {
    /// Tracker with neither end spinning
    pub const fn new() -> Self {
        Self {
            full_spinning: AtomicBool::new(false),
            empty_spinning: AtomicBool::new(false),
        }
    }

    /// Observe the full condition from the enqueue side.
    ///
    /// Returns true when a `Full` event must be emitted, i.e. `is_full`
    /// starts a new spin episode.
    #[inline]
    pub fn note_full(&self, is_full: bool) -> bool {
        Self::note(&self.full_spinning, is_full)
    }

    /// Observe the empty condition from the dequeue side.
    ///
    /// Returns true when an `Empty` event must be emitted.
    #[inline]
    pub fn note_empty(&self, is_empty: bool) -> bool {
        Self::note(&self.empty_spinning, is_empty)
    }

    /// Is the enqueue side inside a full episode?
    pub fn is_full_spinning(&self) -> bool {
        self.full_spinning.load(Ordering::Relaxed)
    }

    /// Is the dequeue side inside an empty episode?
    pub fn is_empty_spinning(&self) -> bool {
        self.empty_spinning.load(Ordering::Relaxed)
    }

    #[inline(always)]
    fn note(flag: &AtomicBool, observed: bool) -> bool {
        if !observed {
            flag.store(false, Ordering::Relaxed);
            return false;
        }
        if flag.load(Ordering::Relaxed) {
            return false;
        }
        flag.store(true, Ordering::Relaxed);
        true
    }
}
