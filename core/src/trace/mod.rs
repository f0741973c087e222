//! # Queue Protocol Tracing
//!
//! Records queue protocol steps with cycle timestamps at a cost low enough
//! to leave the queue's behaviour intact.
//!
//! ## Architecture
//!
//! - `event`: event kinds and records
//! - `ring`: wait-free circular log and the clock-stamping recorder
//! - `spin`: one event per full/empty spin episode
//! - `level`: the three build-time verbosity levels
//! - `dump`: raw and human-readable text rendering

pub mod dump;
pub mod event;
pub mod level;
pub mod ring;
pub mod spin;

pub use dump::{Dumper, Snapshot};
pub use event::{EventKind, EventKinds, TraceRecord};
pub use level::{
    CapacityTracer, DefaultTracer, FullTracer, NoopTracer, TraceLevel, Tracer, TRACE_LEVEL,
};
pub use ring::{EventRecorder, TraceRing, DEFAULT_TRACE_LENGTH};
pub use spin::SpinStateTracker;
