//! # Cache-Aligned Buffers
//!
//! Allocate storage for `n` elements whose base address is a multiple of
//! the cache line size.
//!
//! ## Strategy
//!
//! The underlying allocation is over-sized by `align - 1` bytes so that an
//! aligned address always exists inside it. The aligned address is found
//! by rounding up on the full `usize` width with
//! [`qed_hal::cache::align_up`].
//!
//! The original allocation is kept so it can be released on drop.

use alloc::alloc::{alloc, alloc_zeroed, dealloc, Layout};
use core::fmt;
use core::marker::PhantomData;
use core::mem::{self, MaybeUninit};
use core::ptr::NonNull;

use qed_hal::cache::{align_up, CACHE_LINE_SIZE};

use crate::error::{MemoryError, MemoryResult};

// =============================================================================
// Allocation
// =============================================================================

/// Allocate uninitialized storage for `n` elements of `T` on a cache line
/// boundary
pub fn allocate<T>(n: usize) -> MemoryResult<AlignedBuffer<T>> {
    AlignedBuffer::allocate_with(n, false)
}

/// Allocate zero-filled storage for `n` elements of `T` on a cache line
/// boundary
pub fn allocate_zeroed<T>(n: usize) -> MemoryResult<AlignedBuffer<T>> {
    AlignedBuffer::allocate_with(n, true)
}

/// Alignment used for buffers of `T`
#[inline]
pub const fn alignment_for<T>() -> usize {
    let natural = mem::align_of::<T>();
    if natural > CACHE_LINE_SIZE {
        natural
    } else {
        CACHE_LINE_SIZE
    }
}

// =============================================================================
// Aligned Buffer
// =============================================================================

/// Owning handle to a cache-line aligned run of `len` slots of `T`.
///
/// The slots are raw storage: the buffer never reads, initializes or drops
/// elements. Whoever writes into it is responsible for their lifetimes.
pub struct AlignedBuffer<T> {
    /// First aligned slot
    ptr: NonNull<T>,
    /// Number of slots
    len: usize,
    /// Start of the underlying allocation
    raw: NonNull<u8>,
    /// Layout of the underlying allocation
    layout: Layout,
    _marker: PhantomData<T>,
}

impl<T> AlignedBuffer<T> {
    fn allocate_with(n: usize, zeroed: bool) -> MemoryResult<Self> {
        if n == 0 {
            return Err(MemoryError::ZeroLength);
        }

        let align = alignment_for::<T>();
        let payload = n
            .checked_mul(mem::size_of::<T>())
            .ok_or(MemoryError::CapacityOverflow)?;
        let padded = payload
            .checked_add(align - 1)
            .ok_or(MemoryError::CapacityOverflow)?;
        let layout =
            Layout::from_size_align(padded, 1).map_err(|_| MemoryError::CapacityOverflow)?;

        // SAFETY: `padded >= align - 1 >= 63`, so the layout is never zero-sized.
        let raw = unsafe {
            if zeroed {
                alloc_zeroed(layout)
            } else {
                alloc(layout)
            }
        };
        let raw = match NonNull::new(raw) {
            Some(raw) => raw,
            None => {
                log::warn!("Memory: aligned allocation of {} bytes failed", padded);
                return Err(MemoryError::OutOfMemory);
            },
        };

        let addr = raw.as_ptr() as usize;
        let aligned = match align_up(addr, align) {
            Some(aligned) => aligned,
            None => {
                // SAFETY: `raw` came from the allocator with `layout` just above
                unsafe { dealloc(raw.as_ptr(), layout) };
                return Err(MemoryError::CapacityOverflow);
            },
        };
        let offset = aligned - addr;

        // SAFETY: `offset < align` and the allocation holds `payload + align - 1`
        // bytes, so the aligned run of `payload` bytes stays in bounds.
        let ptr = unsafe { raw.as_ptr().add(offset) }.cast::<T>();

        log::trace!(
            "Memory: {} x {} bytes at {:#x} (offset {})",
            n,
            mem::size_of::<T>(),
            aligned,
            offset
        );

        Ok(Self {
            // SAFETY: derived from a non-null pointer by an in-bounds offset
            ptr: unsafe { NonNull::new_unchecked(ptr) },
            len: n,
            raw,
            layout,
            _marker: PhantomData,
        })
    }

    /// Number of element slots
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: zero-length buffers are rejected at allocation
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pointer to the first slot
    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Mutable pointer to the first slot
    #[inline(always)]
    pub fn as_mut_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Alignment of the first slot
    #[inline]
    pub fn alignment(&self) -> usize {
        alignment_for::<T>()
    }

    /// Bytes obtained from the global allocator, padding included
    #[inline]
    pub fn raw_allocation_size(&self) -> usize {
        self.layout.size()
    }

    /// View the slots as uninitialized storage
    pub fn as_uninit_slice_mut(&mut self) -> &mut [MaybeUninit<T>] {
        // SAFETY: the buffer owns `len` properly aligned slots, and
        // `MaybeUninit` makes no claim about their contents.
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr().cast(), self.len) }
    }
}

impl<T> Drop for AlignedBuffer<T> {
    fn drop(&mut self) {
        // SAFETY: `raw` was returned by the global allocator for `layout`
        unsafe { dealloc(self.raw.as_ptr(), self.layout) };
    }
}

// SAFETY: the buffer is plain owned storage; sharing it is as safe as
// sharing the elements placed in it.
unsafe impl<T: Send> Send for AlignedBuffer<T> {}
unsafe impl<T: Sync> Sync for AlignedBuffer<T> {}

impl<T> fmt::Debug for AlignedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("raw_size", &self.layout.size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_aligned<T>(n: usize) {
        let buf = allocate::<T>(n).unwrap();
        assert_eq!(
            buf.as_ptr() as usize % 64,
            0,
            "n = {} size = {}",
            n,
            mem::size_of::<T>()
        );
        assert_eq!(buf.len(), n);
    }

    #[test]
    fn test_alignment_property() {
        for n in 1..=512 {
            assert_aligned::<u8>(n);
            assert_aligned::<u32>(n);
            assert_aligned::<u64>(n);
            assert_aligned::<[u8; 3]>(n);
        }
        for shift in 10..20 {
            assert_aligned::<u64>(1 << shift);
            assert_aligned::<u8>((1 << shift) + 1);
        }
    }

    #[test]
    fn test_alignment_under_varied_heap_state() {
        // Interleave small allocations so the allocator hands out
        // differently aligned raw blocks.
        let mut keep = Vec::new();
        for n in 1..200usize {
            keep.push(vec![0u8; n % 13 + 1]);
            let buf = allocate::<u16>(n).unwrap();
            assert!(qed_hal::cache::is_aligned(buf.as_ptr() as usize, CACHE_LINE_SIZE));
        }
    }

    #[test]
    fn test_over_aligned_type() {
        #[repr(align(128))]
        struct Wide([u8; 128]);

        let buf = allocate::<Wide>(3).unwrap();
        assert_eq!(buf.alignment(), 128);
        assert_eq!(buf.as_ptr() as usize % 128, 0);
    }

    #[test]
    fn test_zero_sized_type() {
        let buf = allocate::<()>(16).unwrap();
        assert_eq!(buf.as_ptr() as usize % 64, 0);
        assert_eq!(buf.len(), 16);
    }

    #[test]
    fn test_zeroed() {
        let buf = allocate_zeroed::<u64>(100).unwrap();
        let slice = unsafe { core::slice::from_raw_parts(buf.as_ptr(), buf.len()) };
        assert!(slice.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_padding_accounted() {
        let buf = allocate::<u32>(10).unwrap();
        assert_eq!(buf.raw_allocation_size(), 10 * 4 + 63);
    }

    #[test]
    fn test_write_read_slots() {
        let mut buf = allocate::<u64>(8).unwrap();
        for (i, slot) in buf.as_uninit_slice_mut().iter_mut().enumerate() {
            slot.write(i as u64 * 3);
        }
        let value = unsafe { buf.as_ptr().add(7).read() };
        assert_eq!(value, 21);
    }

    #[test]
    fn test_zero_length_rejected() {
        assert_eq!(allocate::<u64>(0).unwrap_err(), MemoryError::ZeroLength);
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(
            allocate::<u64>(usize::MAX / 4).unwrap_err(),
            MemoryError::CapacityOverflow
        );
        assert_eq!(
            allocate::<u8>(usize::MAX - 10).unwrap_err(),
            MemoryError::CapacityOverflow
        );
    }
}
