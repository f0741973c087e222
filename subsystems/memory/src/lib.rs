//! # QED Memory Subsystem
//!
//! Payload storage for queues: buffers whose base address sits on a cache
//! line boundary, so that the first slot never shares a line with
//! unrelated data.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

extern crate alloc;

pub mod aligned;
pub mod error;

pub use aligned::{allocate, allocate_zeroed, AlignedBuffer};
pub use error::{MemoryError, MemoryResult};
