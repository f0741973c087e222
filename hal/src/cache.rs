//! # Cache Geometry
//!
//! Cache line size and a padding wrapper that keeps hot shared state on a
//! line of its own.

use core::ops::{Deref, DerefMut};

// =============================================================================
// CACHE LINE SIZE
// =============================================================================

/// Cache line size assumed for alignment (64 bytes on x86_64 and most AArch64)
pub const CACHE_LINE_SIZE: usize = 64;

static_assertions::const_assert!(CACHE_LINE_SIZE.is_power_of_two());

/// Round `addr` up to a multiple of `align`, a power of two.
///
/// Works on the full pointer width; returns `None` on overflow.
#[inline]
pub const fn align_up(addr: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    let mask = align - 1;
    match addr.checked_add(mask) {
        Some(bumped) => Some(bumped & !mask),
        None => None,
    }
}

/// Is `addr` a multiple of `align`, a power of two?
#[inline(always)]
pub const fn is_aligned(addr: usize, align: usize) -> bool {
    addr & (align - 1) == 0
}

// =============================================================================
// CACHE ALIGNED WRAPPER
// =============================================================================

/// Pads and aligns `T` to a full cache line to avoid false sharing
#[derive(Debug, Default)]
#[repr(align(64))]
pub struct CacheAligned<T>(pub T);

static_assertions::const_assert_eq!(core::mem::align_of::<CacheAligned<u8>>(), CACHE_LINE_SIZE);

impl<T> CacheAligned<T> {
    /// Wrap a value
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    /// Unwrap the value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for CacheAligned<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for CacheAligned<T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}
