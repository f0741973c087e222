//! A bounded single-producer single-consumer queue built on `QueueBase`,
//! driven from two threads, with the resulting trace checked afterwards.

use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use qed_core::trace::{
    Dumper, EventKind, FullTracer, NoopTracer, TraceRecord, TraceRing, Tracer,
};
use qed_core::{QueueBase, QueueHooks};
use qed_hal::{CacheAligned, FakeClock};

// =============================================================================
// Test queue
// =============================================================================

struct Spsc<T, R: Tracer> {
    base: QueueBase<MaybeUninit<T>, R>,
    head: CacheAligned<AtomicUsize>,
    tail: CacheAligned<AtomicUsize>,
}

// SAFETY: one producer and one consumer; slots are handed over through
// the release/acquire pairs on `head` and `tail`.
unsafe impl<T: Send, R: Tracer> Sync for Spsc<T, R> {}
unsafe impl<T: Send, R: Tracer> Send for Spsc<T, R> {}

impl<T, R: Tracer> Spsc<T, R> {
    fn new(capacity: usize, tracer: R) -> Self {
        let base = QueueBase::with_tracer(capacity, tracer).unwrap();
        base.on_set_capacity(capacity);
        Self {
            base,
            head: CacheAligned::new(AtomicUsize::new(0)),
            tail: CacheAligned::new(AtomicUsize::new(0)),
        }
    }

    fn try_push(&self, value: T) -> Result<(), T> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        let full = tail - head == self.base.capacity();
        self.base.on_full(full);
        if full {
            return Err(value);
        }

        self.base.on_reserve_enqueue(tail);
        unsafe {
            (*self.base.buf().add(tail % self.base.capacity())).write(value);
        }
        self.tail.store(tail + 1, Ordering::Release);
        self.base.on_commit_enqueue(tail);
        Ok(())
    }

    fn try_pop(&self) -> Option<T> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        let empty = head == tail;
        self.base.on_empty(empty);
        if empty {
            return None;
        }

        self.base.on_reserve_dequeue(head);
        let value = unsafe { (*self.base.buf().add(head % self.base.capacity())).assume_init_read() };
        self.head.store(head + 1, Ordering::Release);
        self.base.on_commit_dequeue(head);
        Some(value)
    }
}

fn run<R: Tracer + 'static>(queue: Arc<Spsc<u64, R>>, items: u64) -> Vec<u64> {
    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for i in 0..items {
                while queue.try_push(i).is_err() {
                    std::hint::spin_loop();
                }
            }
        })
    };

    let mut received = Vec::with_capacity(items as usize);
    while received.len() < items as usize {
        match queue.try_pop() {
            Some(v) => received.push(v),
            None => std::hint::spin_loop(),
        }
    }
    producer.join().unwrap();
    received
}

fn values_of(records: &[TraceRecord], kind: EventKind) -> Vec<i64> {
    records.iter().filter(|r| r.kind == kind).map(|r| r.value).collect()
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_full_trace_of_spsc_run() {
    const ITEMS: u64 = 2000;

    // Worst case per item: reserve + commit on each side plus one spin
    // episode on each side.
    let ring = TraceRing::with_capacity(1 << 15).unwrap();
    let queue = Arc::new(Spsc::new(8, FullTracer::with_clock(ring, FakeClock::new())));
    let received = run(Arc::clone(&queue), ITEMS);
    assert_eq!(received, (0..ITEMS).collect::<Vec<_>>());

    let tracer = queue.base.tracer();
    let ring = tracer.ring().unwrap();
    assert!(ring.written() <= ring.capacity() as u64);
    let records: Vec<TraceRecord> = Dumper::new(ring).snapshot().collect();

    assert_eq!(records[0].kind, EventKind::SetCapacity);
    assert_eq!(records[0].value, 8);

    // One thread per side: its events keep program order in the ring
    let expected: Vec<i64> = (0..ITEMS as i64).collect();
    assert_eq!(values_of(&records, EventKind::ReserveEnqueue), expected);
    assert_eq!(values_of(&records, EventKind::CommitEnqueue), expected);
    assert_eq!(values_of(&records, EventKind::ReserveDequeue), expected);
    assert_eq!(values_of(&records, EventKind::CommitDequeue), expected);

    // Spin events come at most once per episode: never twice in a row
    // within one side's event stream.
    let producer_side: Vec<EventKind> = records
        .iter()
        .map(|r| r.kind)
        .filter(|k| matches!(k, EventKind::Full | EventKind::ReserveEnqueue))
        .collect();
    assert!(producer_side
        .windows(2)
        .all(|w| !(w[0] == EventKind::Full && w[1] == EventKind::Full)));

    let consumer_side: Vec<EventKind> = records
        .iter()
        .map(|r| r.kind)
        .filter(|k| matches!(k, EventKind::Empty | EventKind::ReserveDequeue))
        .collect();
    assert!(consumer_side
        .windows(2)
        .all(|w| !(w[0] == EventKind::Empty && w[1] == EventKind::Empty)));
}

#[test]
fn test_spsc_with_tracing_compiled_out() {
    let queue = Arc::new(Spsc::new(4, NoopTracer));
    let received = run(Arc::clone(&queue), 500);
    assert_eq!(received.len(), 500);
    assert_eq!(queue.base.tracer().written(), 0);

    let mut out = String::new();
    queue.base.dump_raw(&mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_small_ring_keeps_latest_window() {
    let ring = TraceRing::with_capacity(16).unwrap();
    let queue = Spsc::new(4, FullTracer::with_clock(ring, FakeClock::new()));
    for round in 0..10u64 {
        queue.try_push(round).unwrap();
        assert_eq!(queue.try_pop(), Some(round));
    }

    let mut out = String::new();
    queue.base.dump_human(&mut out).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 16);
    assert!(lines.last().unwrap().ends_with("commitDequeue 9"));
    assert!(!out.contains("setCapacity"));
}
