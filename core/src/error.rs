//! Core error types

use core::fmt;

use qed_memory::MemoryError;

/// Result type for queue core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Queue core error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// The payload buffer could not be obtained
    Memory(MemoryError),
    /// Trace ring length must be a non-zero power of two
    InvalidTraceCapacity(usize),
}

impl From<MemoryError> for CoreError {
    fn from(err: MemoryError) -> Self {
        CoreError::Memory(err)
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Memory(err) => write!(f, "payload buffer allocation failed: {}", err),
            CoreError::InvalidTraceCapacity(len) => {
                write!(f, "trace ring length {} is not a power of two", len)
            },
        }
    }
}
