//! # Queue Base
//!
//! Owns a queue's payload buffer and its tracer. Holds no enqueue or
//! dequeue logic: concrete algorithms embed a [`QueueBase`], use its
//! buffer and capacity, and report each protocol step through
//! [`QueueHooks`].
//!
//! ```ignore
//! struct Spsc<T> {
//!     base: QueueBase<T>,
//!     head: CacheAligned<AtomicUsize>,
//!     tail: CacheAligned<AtomicUsize>,
//! }
//!
//! // enqueue side
//! let full = tail - head == self.base.capacity();
//! self.base.on_full(full);
//! if !full {
//!     self.base.on_reserve_enqueue(tail);
//!     unsafe { self.base.buf().add(tail % self.base.capacity()).write(value) };
//!     self.tail.store(tail + 1, Ordering::Release);
//!     self.base.on_commit_enqueue(tail);
//! }
//! ```

use core::fmt;

use qed_memory::{allocate, AlignedBuffer};

use crate::error::CoreResult;
use crate::trace::{DefaultTracer, Tracer};

// =============================================================================
// Hooks
// =============================================================================

/// Protocol points a concrete queue reports
pub trait QueueHooks {
    /// Capacity set or changed
    fn on_set_capacity(&self, new_capacity: usize);

    /// Producer claimed slot `index`
    fn on_reserve_enqueue(&self, index: usize);

    /// Consumer claimed slot `index`
    fn on_reserve_dequeue(&self, index: usize);

    /// Producer published slot `index`
    fn on_commit_enqueue(&self, index: usize);

    /// Consumer released slot `index`
    fn on_commit_dequeue(&self, index: usize);

    /// Enqueue side polled the full condition
    fn on_full(&self, is_full: bool);

    /// Dequeue side polled the empty condition
    fn on_empty(&self, is_empty: bool);
}

// =============================================================================
// Queue Base
// =============================================================================

/// Payload buffer, capacity and tracer of a queue
pub struct QueueBase<T, R = DefaultTracer> {
    capacity: usize,
    buf: AlignedBuffer<T>,
    tracer: R,
}

impl<T> QueueBase<T, DefaultTracer> {
    /// Queue base of `capacity` slots traced at the build's level
    pub fn new(capacity: usize) -> CoreResult<Self> {
        Self::with_tracer(capacity, DefaultTracer::default())
    }
}

impl<T, R: Tracer> QueueBase<T, R> {
    /// Queue base of `capacity` slots traced by `tracer`
    pub fn with_tracer(capacity: usize, tracer: R) -> CoreResult<Self> {
        let buf = allocate::<T>(capacity)?;
        log::debug!(
            "Queue: capacity {} at {:p}, trace level {}",
            capacity,
            buf.as_ptr(),
            R::LEVEL
        );
        Ok(Self {
            capacity,
            buf,
            tracer,
        })
    }

    /// Number of payload slots
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raw handle to the first payload slot (cache-line aligned).
    ///
    /// Slots are uninitialized storage; the queue algorithm decides which
    /// are live and must drop them itself.
    #[inline(always)]
    pub fn buf(&self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// The owned payload buffer
    #[inline(always)]
    pub fn buffer(&self) -> &AlignedBuffer<T> {
        &self.buf
    }

    /// The tracer behind the hooks
    #[inline(always)]
    pub fn tracer(&self) -> &R {
        &self.tracer
    }

    /// Raw dump of the trace
    pub fn dump_raw<W: fmt::Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        self.tracer.dump_raw(out)
    }

    /// Human-readable dump of the trace
    pub fn dump_human<W: fmt::Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        self.tracer.dump_human(out)
    }
}

#[cfg(feature = "std")]
impl<T, R: Tracer> QueueBase<T, R> {
    /// Write the raw dump to stdout
    #[inline(never)]
    pub fn dump_to_stdout(&self) -> std::io::Result<()> {
        let mut text = String::new();
        self.dump_raw(&mut text).map_err(std::io::Error::other)?;
        write_stdout(&text)
    }

    /// Write the human-readable dump to stdout
    #[inline(never)]
    pub fn dump_human_to_stdout(&self) -> std::io::Result<()> {
        let mut text = String::new();
        self.dump_human(&mut text).map_err(std::io::Error::other)?;
        write_stdout(&text)
    }
}

#[cfg(feature = "std")]
fn write_stdout(text: &str) -> std::io::Result<()> {
    use std::io::Write;

    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(text.as_bytes())?;
    lock.flush()
}

impl<T, R: Tracer> QueueHooks for QueueBase<T, R> {
    #[inline(always)]
    fn on_set_capacity(&self, new_capacity: usize) {
        self.tracer.set_capacity(new_capacity);
    }

    #[inline(always)]
    fn on_reserve_enqueue(&self, index: usize) {
        self.tracer.reserve_enqueue(index);
    }

    #[inline(always)]
    fn on_reserve_dequeue(&self, index: usize) {
        self.tracer.reserve_dequeue(index);
    }

    #[inline(always)]
    fn on_commit_enqueue(&self, index: usize) {
        self.tracer.commit_enqueue(index);
    }

    #[inline(always)]
    fn on_commit_dequeue(&self, index: usize) {
        self.tracer.commit_dequeue(index);
    }

    #[inline(always)]
    fn on_full(&self, is_full: bool) {
        self.tracer.full(is_full);
    }

    #[inline(always)]
    fn on_empty(&self, is_empty: bool) {
        self.tracer.empty(is_empty);
    }
}

impl<T, R: fmt::Debug> fmt::Debug for QueueBase<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueBase")
            .field("capacity", &self.capacity)
            .field("buf", &self.buf)
            .field("tracer", &self.tracer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use qed_hal::FakeClock;
    use qed_memory::MemoryError;

    use super::*;
    use crate::error::CoreError;
    use crate::trace::{CapacityTracer, FullTracer, NoopTracer, TraceRing};

    fn full_base(capacity: usize, ring: usize) -> QueueBase<u64, FullTracer<FakeClock>> {
        let tracer = FullTracer::with_clock(TraceRing::with_capacity(ring).unwrap(), FakeClock::new());
        QueueBase::with_tracer(capacity, tracer).unwrap()
    }

    #[test]
    fn test_capacity_and_alignment() {
        let base = full_base(100, 16);
        assert_eq!(base.capacity(), 100);
        assert_eq!(base.buffer().len(), 100);
        assert_eq!(base.buf() as usize % 64, 0);
    }

    #[test]
    fn test_zero_capacity_fails_construction() {
        let err = QueueBase::<u64, _>::with_tracer(0, NoopTracer).unwrap_err();
        assert_eq!(err, CoreError::Memory(MemoryError::ZeroLength));
    }

    #[test]
    fn test_huge_capacity_fails_construction() {
        let err = QueueBase::<u64, _>::with_tracer(usize::MAX / 2, NoopTracer).unwrap_err();
        assert_eq!(err, CoreError::Memory(MemoryError::CapacityOverflow));
    }

    #[test]
    fn test_hooks_delegate_to_tracer() {
        let base = full_base(4, 16);
        base.on_set_capacity(4);
        base.on_reserve_enqueue(0);
        base.on_commit_enqueue(0);
        base.on_reserve_dequeue(0);
        base.on_commit_dequeue(0);
        base.on_empty(true);
        base.on_empty(true);
        base.on_empty(false);
        base.on_full(true);

        let mut out = String::new();
        base.dump_human(&mut out).unwrap();
        assert_eq!(
            out,
            "0 setCapacity 4\n\
             1 reserveEnqueue 0\n\
             2 commitEnqueue 0\n\
             3 reserveDequeue 0\n\
             4 commitDequeue 0\n\
             5 empty 0\n\
             6 full 0\n"
        );
    }

    #[test]
    fn test_noop_hooks_leave_no_trace() {
        let base = QueueBase::<u64, _>::with_tracer(8, NoopTracer).unwrap();
        for i in 0..1000 {
            base.on_set_capacity(i);
            base.on_reserve_enqueue(i);
            base.on_commit_enqueue(i);
            base.on_reserve_dequeue(i);
            base.on_commit_dequeue(i);
            base.on_full(i % 3 == 0);
            base.on_empty(i % 5 == 0);
        }
        assert_eq!(base.tracer().written(), 0);

        let mut out = String::new();
        base.dump_raw(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_capacity_level_hooks() {
        let tracer = CapacityTracer::with_clock(TraceRing::with_capacity(8).unwrap(), FakeClock::starting_at(7));
        let base = QueueBase::<u32, _>::with_tracer(8, tracer).unwrap();
        base.on_set_capacity(8);
        base.on_reserve_enqueue(1);
        base.on_full(true);
        base.on_set_capacity(16);

        let mut out = String::new();
        base.dump_raw(&mut out).unwrap();
        assert_eq!(out, "7 0 8\n8 0 16\n");
    }

    #[test]
    fn test_default_tracer_construction() {
        let base = QueueBase::<u8>::new(32).unwrap();
        assert_eq!(base.capacity(), 32);
        base.on_set_capacity(32);
        let expected = if crate::TRACE_LEVEL >= crate::TraceLevel::Capacity {
            1
        } else {
            0
        };
        assert_eq!(base.tracer().written(), expected);
    }
}
