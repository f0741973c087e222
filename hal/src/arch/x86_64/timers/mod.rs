//! # x86_64 Timers
//!
//! Only the Time Stamp Counter is needed: it is readable from user mode
//! with a single instruction.

pub mod tsc;
