//! # AArch64 Architecture Counters

pub mod timers;
