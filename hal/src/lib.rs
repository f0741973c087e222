//! # QED Hardware Abstraction Layer
//!
//! The smallest slice of hardware the queue tracer needs:
//!
//! - **Cycle counters**: a cheap, per-core monotonic counter read by a
//!   single instruction (`rdtsc` on x86_64, `cntvct_el0` on AArch64)
//! - **Cache geometry**: the cache line size buffers are aligned to
//!
//! Everything here is `no_std` and allocation free.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod arch;
pub mod cache;
pub mod clock;

pub use cache::{CacheAligned, CACHE_LINE_SIZE};
pub use clock::{CycleClock, FakeClock, PlatformClock};
