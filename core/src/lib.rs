//! # QED Queue Core
//!
//! Base layer for concurrent queues: the owner of the payload buffer and
//! the instrumentation that records the queue protocol.
//!
//! A concrete queue algorithm holds a [`QueueBase`] and calls its
//! [`QueueHooks`] at each protocol step (reserve, commit, full, empty,
//! capacity change). The hooks forward to the [`Tracer`](trace::Tracer)
//! selected for the build; at level 0 they vanish entirely.
//!
//! ## Features
//!
//! - `trace-capacity`: level 1, record capacity changes
//! - `trace-full`: level 2, record every protocol event
//! - `std`: helpers dumping the trace to stdout

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

pub mod error;
pub mod queue;
pub mod trace;

pub use error::{CoreError, CoreResult};
pub use queue::{QueueBase, QueueHooks};
pub use trace::{DefaultTracer, EventKind, TraceLevel, Tracer, TRACE_LEVEL};
