//! # AArch64 Timers
//!
//! The virtual count of the ARM Generic Timer (`CNTVCT_EL0`) is readable
//! from EL0 and shared by every core of the system.

pub mod counter;
