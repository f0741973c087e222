//! Wait-free trace ring and event recorder
//!
//! Writers claim a logical index with one `fetch_add` and store the record
//! into slot `index & (capacity - 1)`. Nothing else is shared between
//! writers, so recording never blocks, never allocates and never fails.
//! Once more than `capacity` records were written the oldest are silently
//! overwritten.
//!
//! Slot fields are individual atomics written with `Relaxed` stores, which
//! compile to plain moves. A reader racing a writer can observe a record
//! that mixes old and new fields; dumps accept that.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicI64, AtomicU64, AtomicU8, Ordering};

use qed_hal::{CacheAligned, CycleClock};
use qed_memory::MemoryError;

use super::event::{EventKind, TraceRecord};
use crate::error::{CoreError, CoreResult};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default trace ring length (records)
pub const DEFAULT_TRACE_LENGTH: usize = 65536 * 4;

static_assertions::const_assert!(DEFAULT_TRACE_LENGTH.is_power_of_two());

// ============================================================================
// SLOT
// ============================================================================

#[derive(Default)]
struct Slot {
    timestamp: AtomicU64,
    value: AtomicI64,
    kind: AtomicU8,
}

static_assertions::const_assert!(core::mem::size_of::<Slot>() <= 24);

impl Slot {
    #[inline(always)]
    fn store(&self, timestamp: u64, kind: EventKind, value: i64) {
        self.timestamp.store(timestamp, Ordering::Relaxed);
        self.kind.store(kind.raw(), Ordering::Relaxed);
        self.value.store(value, Ordering::Relaxed);
    }

    #[inline]
    fn load(&self) -> TraceRecord {
        TraceRecord {
            timestamp: self.timestamp.load(Ordering::Relaxed),
            // Only valid kinds are ever stored, and slots start as SetCapacity
            kind: EventKind::from_raw(self.kind.load(Ordering::Relaxed))
                .unwrap_or(EventKind::SetCapacity),
            value: self.value.load(Ordering::Relaxed),
        }
    }
}

// ============================================================================
// TRACE RING
// ============================================================================

/// Fixed-capacity circular log of trace records
pub struct TraceRing {
    /// Next logical index; total records ever written
    index: CacheAligned<AtomicU64>,
    /// `capacity - 1`
    mask: u64,
    slots: Box<[Slot]>,
}

impl TraceRing {
    /// Ring of [`DEFAULT_TRACE_LENGTH`] records; panics if the allocator
    /// cannot provide it
    pub fn new() -> Self {
        Self::build(DEFAULT_TRACE_LENGTH).expect("default trace ring allocation")
    }

    /// Ring of `capacity` records; `capacity` must be a non-zero power of two
    pub fn with_capacity(capacity: usize) -> CoreResult<Self> {
        if !capacity.is_power_of_two() {
            return Err(CoreError::InvalidTraceCapacity(capacity));
        }
        Self::build(capacity)
    }

    fn build(capacity: usize) -> CoreResult<Self> {
        let mut slots = Vec::new();
        if slots.try_reserve_exact(capacity).is_err() {
            log::warn!("Trace: cannot allocate a ring of {} records", capacity);
            return Err(CoreError::Memory(MemoryError::OutOfMemory));
        }
        slots.resize_with(capacity, Slot::default);
        Ok(Self {
            index: CacheAligned::new(AtomicU64::new(0)),
            mask: capacity as u64 - 1,
            slots: slots.into_boxed_slice(),
        })
    }

    /// Number of slots
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Append a record with an explicit timestamp
    #[inline]
    pub fn record_at(&self, timestamp: u64, kind: EventKind, value: i64) {
        self.claim().store(timestamp, kind, value);
    }

    /// Take the next logical index and return the slot it maps to
    #[inline(always)]
    fn claim(&self) -> &Slot {
        let index = self.index.fetch_add(1, Ordering::Relaxed);
        &self.slots[(index & self.mask) as usize]
    }

    /// Total records ever written (the logical write index)
    #[inline(always)]
    pub fn written(&self) -> u64 {
        self.index.load(Ordering::Relaxed)
    }

    /// Records currently held
    #[inline]
    pub fn retained(&self) -> usize {
        self.written().min(self.capacity() as u64) as usize
    }

    /// Records lost to wraparound
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.written().saturating_sub(self.capacity() as u64)
    }

    /// Read the slot holding logical index `index`
    #[inline]
    pub(crate) fn read(&self, index: u64) -> TraceRecord {
        self.slots[(index & self.mask) as usize].load()
    }
}

impl Default for TraceRing {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TraceRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceRing")
            .field("capacity", &self.capacity())
            .field("written", &self.written())
            .finish()
    }
}

// ============================================================================
// EVENT RECORDER
// ============================================================================

/// A trace ring stamped by a cycle clock
#[derive(Debug)]
pub struct EventRecorder<C> {
    ring: TraceRing,
    clock: C,
}

impl<C: CycleClock> EventRecorder<C> {
    /// Recorder over `ring` reading timestamps from `clock`
    pub fn new(ring: TraceRing, clock: C) -> Self {
        Self { ring, clock }
    }

    /// Append `{now, kind, value}` to the ring
    #[inline]
    pub fn record(&self, kind: EventKind, value: i64) {
        let slot = self.ring.claim();
        slot.store(self.clock.now(), kind, value);
    }

    /// The underlying ring
    #[inline(always)]
    pub fn ring(&self) -> &TraceRing {
        &self.ring
    }

    /// The clock stamping records
    #[inline(always)]
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
