//! Memory subsystem errors

use core::fmt;

/// Result type for memory operations
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// A buffer of zero elements was requested
    ZeroLength,
    /// The requested size (plus alignment padding) does not fit a layout
    CapacityOverflow,
    /// The global allocator returned null
    OutOfMemory,
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::ZeroLength => write!(f, "zero-length buffer requested"),
            MemoryError::CapacityOverflow => write!(f, "buffer size overflows the address space"),
            MemoryError::OutOfMemory => write!(f, "out of memory"),
        }
    }
}
