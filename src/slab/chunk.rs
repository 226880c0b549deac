/*!
 * Slab Chunk
 * One raw memory region subdivided into fixed-size slots
 */

use crate::core::limits::DEFAULT_ALIGNMENT;
use crate::core::types::{PoolError, PoolResult, Size};
use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

/// A chunk lives for the lifetime of its owning pool and is never freed
/// individually; only its slots change "in use" status.
pub(super) struct Chunk {
    start: NonNull<u8>,
    layout: Layout,
    n_slots: usize,
    slot_size: Size,
}

impl Chunk {
    pub fn new(n_slots: usize, slot_size: Size) -> PoolResult<Self> {
        let bytes = n_slots
            .checked_mul(slot_size)
            .ok_or(PoolError::OutOfMemory {
                requested: usize::MAX,
            })?;
        let layout = Layout::from_size_align(bytes, DEFAULT_ALIGNMENT)
            .map_err(|_| PoolError::OutOfMemory { requested: bytes })?;
        let raw = unsafe { alloc(layout) };
        let start = NonNull::new(raw).ok_or(PoolError::OutOfMemory { requested: bytes })?;
        Ok(Self {
            start,
            layout,
            n_slots,
            slot_size,
        })
    }

    /// Address of slot `index`
    pub fn slot(&self, index: usize) -> NonNull<u8> {
        debug_assert!(index < self.n_slots);
        unsafe { NonNull::new_unchecked(self.start.as_ptr().add(index * self.slot_size)) }
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        unsafe { dealloc(self.start.as_ptr(), self.layout) };
    }
}
