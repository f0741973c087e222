//! # x86_64 Architecture Counters

pub mod timers;
