//! Build-time trace verbosity
//!
//! Three implementations of [`Tracer`], one per level:
//!
//! | Level | Tracer             | Records                          |
//! |-------|--------------------|----------------------------------|
//! | 0     | [`NoopTracer`]     | nothing, every hook is empty     |
//! | 1     | [`CapacityTracer`] | `SetCapacity`                    |
//! | 2     | [`FullTracer`]     | every protocol event             |
//!
//! [`DefaultTracer`] is picked once per build from the `trace-capacity`
//! and `trace-full` cargo features. There is no runtime switch, so a
//! level 0 build carries no trace state and no trace instructions.

use core::fmt;

use qed_hal::{CycleClock, PlatformClock};

use super::dump::Dumper;
use super::event::{EventKind, EventKinds};
use super::ring::{EventRecorder, TraceRing};
use super::spin::SpinStateTracker;

// ============================================================================
// TRACE LEVEL
// ============================================================================

/// Trace verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TraceLevel {
    /// Tracing compiled out
    Off      = 0,
    /// Capacity changes only
    Capacity = 1,
    /// Every protocol event
    Full     = 2,
}

impl TraceLevel {
    /// Event kinds recorded at this level
    pub fn recorded_kinds(self) -> EventKinds {
        match self {
            TraceLevel::Off => EventKinds::empty(),
            TraceLevel::Capacity => EventKinds::SET_CAPACITY,
            TraceLevel::Full => EventKinds::all(),
        }
    }

    /// Does this level record `kind`?
    #[inline]
    pub fn records(self, kind: EventKind) -> bool {
        self.recorded_kinds().contains(kind.bit())
    }
}

impl fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

// ============================================================================
// TRACER TRAIT
// ============================================================================

/// Instrumentation behind the queue hooks
pub trait Tracer: Send + Sync {
    /// Verbosity implemented by this tracer
    const LEVEL: TraceLevel;

    /// Capacity changed to `new_capacity`
    fn set_capacity(&self, new_capacity: usize);

    /// Producer claimed slot `tail`
    fn reserve_enqueue(&self, tail: usize);

    /// Consumer claimed slot `head`
    fn reserve_dequeue(&self, head: usize);

    /// Producer published slot `tail`
    fn commit_enqueue(&self, tail: usize);

    /// Consumer released slot `head`
    fn commit_dequeue(&self, head: usize);

    /// Enqueue side observed the queue as full (or no longer full)
    fn full(&self, is_full: bool);

    /// Dequeue side observed the queue as empty (or no longer empty)
    fn empty(&self, is_empty: bool);

    /// Ring holding the records, if this level keeps one
    fn ring(&self) -> Option<&TraceRing>;

    /// Total records written so far
    #[inline]
    fn written(&self) -> u64 {
        self.ring().map_or(0, TraceRing::written)
    }

    /// Raw dump of the retained records; empty when nothing is kept
    fn dump_raw<W: fmt::Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        match self.ring() {
            Some(ring) => Dumper::new(ring).dump_raw(out),
            None => Ok(()),
        }
    }

    /// Human-readable dump of the retained records
    fn dump_human<W: fmt::Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        match self.ring() {
            Some(ring) => Dumper::new(ring).dump_human(out),
            None => Ok(()),
        }
    }
}

// ============================================================================
// LEVEL 0
// ============================================================================

/// Level 0: no state, no work
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

static_assertions::assert_eq_size!(NoopTracer, ());

impl Tracer for NoopTracer {
    const LEVEL: TraceLevel = TraceLevel::Off;

    #[inline(always)]
    fn set_capacity(&self, _new_capacity: usize) {}

    #[inline(always)]
    fn reserve_enqueue(&self, _tail: usize) {}

    #[inline(always)]
    fn reserve_dequeue(&self, _head: usize) {}

    #[inline(always)]
    fn commit_enqueue(&self, _tail: usize) {}

    #[inline(always)]
    fn commit_dequeue(&self, _head: usize) {}

    #[inline(always)]
    fn full(&self, _is_full: bool) {}

    #[inline(always)]
    fn empty(&self, _is_empty: bool) {}

    #[inline(always)]
    fn ring(&self) -> Option<&TraceRing> {
        None
    }

    #[inline(always)]
    fn written(&self) -> u64 {
        0
    }
}

// ============================================================================
// LEVEL 1
// ============================================================================

/// Level 1: records capacity changes only
#[derive(Debug)]
pub struct CapacityTracer<C = PlatformClock> {
    recorder: EventRecorder<C>,
}

impl<C: CycleClock> CapacityTracer<C> {
    /// Tracer recording into `ring` with timestamps from `clock`
    pub fn with_clock(ring: TraceRing, clock: C) -> Self {
        Self {
            recorder: EventRecorder::new(ring, clock),
        }
    }
}

impl Default for CapacityTracer<PlatformClock> {
    fn default() -> Self {
        Self::with_clock(TraceRing::new(), PlatformClock::new())
    }
}

impl<C: CycleClock> Tracer for CapacityTracer<C> {
    const LEVEL: TraceLevel = TraceLevel::Capacity;

    #[inline]
    fn set_capacity(&self, new_capacity: usize) {
        self.recorder.record(EventKind::SetCapacity, new_capacity as i64);
    }

    #[inline(always)]
    fn reserve_enqueue(&self, _tail: usize) {}

    #[inline(always)]
    fn reserve_dequeue(&self, _head: usize) {}

    #[inline(always)]
    fn commit_enqueue(&self, _tail: usize) {}

    #[inline(always)]
    fn commit_dequeue(&self, _head: usize) {}

    #[inline(always)]
    fn full(&self, _is_full: bool) {}

    #[inline(always)]
    fn empty(&self, _is_empty: bool) {}

    #[inline(always)]
    fn ring(&self) -> Option<&TraceRing> {
        Some(self.recorder.ring())
    }
}

// ============================================================================
// LEVEL 2
// ============================================================================

/// Level 2: records every protocol event, one `Full`/`Empty` per spin
/// episode
#[derive(Debug)]
pub struct FullTracer<C = PlatformClock> {
    recorder: EventRecorder<C>,
    spin: SpinStateTracker,
}

impl<C: CycleClock> FullTracer<C> {
    /// Tracer recording into `ring` with timestamps from `clock`
    pub fn with_clock(ring: TraceRing, clock: C) -> Self {
        Self {
            recorder: EventRecorder::new(ring, clock),
            spin: SpinStateTracker::new(),
        }
    }

    /// Spin flags of the two queue ends
    pub fn spin_state(&self) -> &SpinStateTracker {
        &self.spin
    }
}

impl Default for FullTracer<PlatformClock> {
    fn default() -> Self {
        Self::with_clock(TraceRing::new(), PlatformClock::new())
    }
}

impl<C: CycleClock> Tracer for FullTracer<C> {
    const LEVEL: TraceLevel = TraceLevel::Full;

    #[inline]
    fn set_capacity(&self, new_capacity: usize) {
        self.recorder.record(EventKind::SetCapacity, new_capacity as i64);
    }

    #[inline]
    fn reserve_enqueue(&self, tail: usize) {
        self.recorder.record(EventKind::ReserveEnqueue, tail as i64);
    }

    #[inline]
    fn reserve_dequeue(&self, head: usize) {
        self.recorder.record(EventKind::ReserveDequeue, head as i64);
    }

    #[inline]
    fn commit_enqueue(&self, tail: usize) {
        self.recorder.record(EventKind::CommitEnqueue, tail as i64);
    }

    #[inline]
    fn commit_dequeue(&self, head: usize) {
        self.recorder.record(EventKind::CommitDequeue, head as i64);
    }

    #[inline]
    fn full(&self, is_full: bool) {
        if self.spin.note_full(is_full) {
            self.recorder.record(EventKind::Full, 0);
        }
    }

    #[inline]
    fn empty(&self, is_empty: bool) {
        if self.spin.note_empty(is_empty) {
            self.recorder.record(EventKind::Empty, 0);
        }
    }

    #[inline(always)]
    fn ring(&self) -> Option<&TraceRing> {
        Some(self.recorder.ring())
    }
}

// ============================================================================
// BUILD SELECTION
// ============================================================================

cfg_if::cfg_if! {
    if #[cfg(feature = "trace-full")] {
        /// Tracer selected for this build (level 2)
        pub type DefaultTracer = FullTracer<PlatformClock>;
    } else if #[cfg(feature = "trace-capacity")] {
        /// Tracer selected for this build (level 1)
        pub type DefaultTracer = CapacityTracer<PlatformClock>;
    } else {
        /// Tracer selected for this build (level 0)
        pub type DefaultTracer = NoopTracer;
    }
}

/// Verbosity compiled into this build
pub const TRACE_LEVEL: TraceLevel = <DefaultTracer as Tracer>::LEVEL;
