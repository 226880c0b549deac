/*!
 * Pool Block
 * One contiguous memory region with a bump cursor
 */

use crate::core::limits::{align_up, DEFAULT_ALIGNMENT, POOL_ALIGNMENT};
use crate::core::types::{Address, PoolError, PoolResult, Size};
use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

/// An owned raw region plus bump state
///
/// The cursor and capacity are byte offsets from `start`; `last <= end`
/// holds at all times.
pub(super) struct Block {
    start: NonNull<u8>,
    layout: Layout,
    /// Bump cursor
    last: usize,
    /// Usable capacity
    end: usize,
    /// Initial cursor position, restored on rewind
    reserved: usize,
    /// Consecutive requests this block could not satisfy
    failed: u32,
}

impl Block {
    pub fn new(capacity: Size, reserved: usize) -> PoolResult<Self> {
        let layout = Layout::from_size_align(capacity, POOL_ALIGNMENT)
            .map_err(|_| PoolError::OutOfMemory {
                requested: capacity,
            })?;
        let raw = unsafe { alloc(layout) };
        let start = NonNull::new(raw).ok_or(PoolError::OutOfMemory {
            requested: capacity,
        })?;
        Ok(Self {
            start,
            layout,
            last: reserved,
            end: capacity,
            reserved,
            failed: 0,
        })
    }

    /// Bump-allocate `size` bytes, optionally aligning the cursor first
    pub fn bump(&mut self, size: Size, aligned: bool) -> Option<NonNull<u8>> {
        let offset = if aligned {
            align_up(self.last, DEFAULT_ALIGNMENT)
        } else {
            self.last
        };
        if size <= self.end.saturating_sub(offset) {
            self.last = offset + size;
            Some(unsafe { NonNull::new_unchecked(self.start.as_ptr().add(offset)) })
        } else {
            None
        }
    }

    /// Rewind the cursor to its initial position and forget past misses
    pub fn rewind(&mut self) {
        self.last = self.reserved;
        self.failed = 0;
    }

    pub fn note_failure(&mut self) {
        self.failed = self.failed.saturating_add(1);
    }

    pub fn failures(&self) -> u32 {
        self.failed
    }

    /// Whether `addr` falls within this block's region
    pub fn contains(&self, addr: Address) -> bool {
        let start = self.start.as_ptr() as Address;
        addr >= start && addr < start + self.end
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        unsafe { dealloc(self.start.as_ptr(), self.layout) };
    }
}
