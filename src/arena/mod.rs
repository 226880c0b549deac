/*!
 * Arena Pool
 *
 * Bump allocator over a chain of memory blocks, with a side list for
 * oversized requests and LIFO cleanup callbacks.
 *
 * ## Allocation strategy
 *
 * - **Bump path** (requests up to the pool's `max` threshold): scan blocks
 *   from the `current` cursor for one with room, advance its bump pointer,
 *   and hand the address out. No per-allocation bookkeeping.
 * - **Large path** (everything bigger, and all explicitly-aligned
 *   requests): served directly by the system allocator and tracked in a
 *   record list so it can be freed early or at teardown.
 * - Blocks that miss too many requests in a row are skipped by the scan
 *   cursor instead of being re-scanned forever.
 *
 * ## Lifecycle
 *
 * A pool is created empty, reset any number of times (cleanups fire LIFO,
 * large allocations are released, block memory is retained), and destroyed
 * exactly once. The pool is exclusively owned by one caller at a time;
 * hand it to the cache agent or another owner by value.
 */

mod block;

use crate::core::limits::{
    align_up, DEFAULT_POOL_SIZE, MAX_ALLOC_FROM_POOL, MAX_BLOCK_FAILURES, POOL_ALIGNMENT,
};
use crate::core::types::{Address, PoolError, PoolResult, Size};
use block::Block;
use log::{debug, trace, warn};
use std::alloc::{alloc, dealloc, Layout};
use std::mem;
use std::ptr::NonNull;

/// Cleanup callback, run exactly once at the next reset or at destroy
type CleanupFn = Box<dyn FnOnce()>;

/// A system-allocator-backed buffer tracked for early or teardown release
struct LargeAlloc {
    ptr: NonNull<u8>,
    layout: Layout,
}

/// Space reserved at the head of the first block, sized like the pool
/// control structure so offsets match an embedded-header layout
const CONTROL_SIZE: usize = align_up(mem::size_of::<Pool>(), POOL_ALIGNMENT);

/// Smallest usable pool: control structure plus two large-allocation records
pub const MIN_POOL_SIZE: usize =
    align_up(CONTROL_SIZE + 2 * mem::size_of::<LargeAlloc>(), POOL_ALIGNMENT);

/// Arena allocator over chained bump-allocated blocks
pub struct Pool {
    blocks: Vec<Block>,
    /// Index of the first block worth scanning for room
    current: usize,
    /// Largest request served by bump allocation
    max: Size,
    /// Capacity of the first block and of every block grown after it
    block_size: Size,
    large: Vec<LargeAlloc>,
    cleanups: Vec<CleanupFn>,
}

impl Pool {
    /// Create a pool whose first block holds `size` bytes
    ///
    /// `size` is clamped to [`MIN_POOL_SIZE`]. Never returns a partially
    /// initialized pool: the block allocation either succeeds in full or
    /// the failure propagates.
    pub fn create(size: Size) -> PoolResult<Self> {
        let size = size.max(MIN_POOL_SIZE);
        let block = Block::new(size, CONTROL_SIZE)?;
        let max = (size - CONTROL_SIZE).min(MAX_ALLOC_FROM_POOL);
        debug!("Pool created: {} byte block, {} byte bump limit", size, max);
        Ok(Self {
            blocks: vec![block],
            current: 0,
            max,
            block_size: size,
            large: Vec::new(),
            cleanups: Vec::new(),
        })
    }

    /// Create a pool of [`DEFAULT_POOL_SIZE`]
    pub fn with_default_size() -> PoolResult<Self> {
        Self::create(DEFAULT_POOL_SIZE)
    }

    /// Allocate `size` bytes, aligned for word-sized data
    pub fn alloc(&mut self, size: Size) -> PoolResult<NonNull<u8>> {
        if size <= self.max {
            self.alloc_small(size, true)
        } else {
            self.alloc_large(size)
        }
    }

    /// Allocate `size` bytes with no cursor alignment (tight packing)
    pub fn alloc_unaligned(&mut self, size: Size) -> PoolResult<NonNull<u8>> {
        if size <= self.max {
            self.alloc_small(size, false)
        } else {
            self.alloc_large(size)
        }
    }

    /// Allocate `size` bytes, zero-filled
    pub fn alloc_zeroed(&mut self, size: Size) -> PoolResult<NonNull<u8>> {
        let ptr = self.alloc(size)?;
        unsafe { ptr.as_ptr().write_bytes(0, size) };
        Ok(ptr)
    }

    /// Allocate with an explicit power-of-two alignment
    ///
    /// Always served from the system allocator and tracked as a large
    /// allocation, regardless of `size`.
    pub fn alloc_aligned_to(&mut self, size: Size, alignment: Size) -> PoolResult<NonNull<u8>> {
        if !alignment.is_power_of_two() {
            return Err(PoolError::BadAlignment { alignment });
        }
        // Zero-sized requests still produce a distinct, freeable allocation
        let size = size.max(1);
        let layout = Layout::from_size_align(size, alignment)
            .map_err(|_| PoolError::OutOfMemory { requested: size })?;
        self.track_large(layout)
    }

    /// Release one tracked large allocation ahead of reset/destroy
    ///
    /// Only memory that came from the large path may be freed this way;
    /// bump-allocated addresses are reclaimed in bulk by [`Pool::reset`].
    /// An untracked pointer is reported as an error and the pool is left
    /// unchanged.
    pub fn free_large(&mut self, ptr: NonNull<u8>) -> PoolResult<()> {
        match self.large.iter().position(|l| l.ptr == ptr) {
            Some(idx) => {
                let record = self.large.swap_remove(idx);
                unsafe { dealloc(record.ptr.as_ptr(), record.layout) };
                trace!("Freed large allocation at {:p}", ptr.as_ptr());
                Ok(())
            }
            None => {
                warn!("Attempted to free untracked pointer {:p}", ptr.as_ptr());
                Err(PoolError::InvalidFree(ptr.as_ptr() as Address))
            }
        }
    }

    /// Register a cleanup to run exactly once at the next [`Pool::reset`]
    /// or when the pool is dropped
    ///
    /// Cleanups fire in reverse registration order, before any large
    /// allocation in the same pool is released. Whatever state the
    /// callback needs travels in the closure capture, owned by the pool
    /// until it fires.
    pub fn add_cleanup<F>(&mut self, cleanup: F)
    where
        F: FnOnce() + 'static,
    {
        self.cleanups.push(Box::new(cleanup));
    }

    /// Rewind the pool for reuse
    ///
    /// Runs cleanups (LIFO), releases large allocations, rewinds every
    /// block's cursor and failure counter, and points the scan cursor back
    /// at the head block. Block memory itself is retained, which is what
    /// makes cached reuse cheap.
    pub fn reset(&mut self) {
        self.teardown();
        for block in &mut self.blocks {
            block.rewind();
        }
        self.current = 0;
        trace!("Pool reset: {} blocks retained", self.blocks.len());
    }

    /// Consume the pool, releasing every block
    ///
    /// Equivalent to dropping it; provided for call-site symmetry with
    /// [`Pool::create`].
    pub fn destroy(self) {}

    /// Number of blocks currently chained
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of tracked large allocations
    pub fn large_count(&self) -> usize {
        self.large.len()
    }

    /// Largest request served by bump allocation
    pub fn small_limit(&self) -> Size {
        self.max
    }

    /// Whether `ptr` points into one of the pool's blocks
    ///
    /// Large allocations live outside the blocks and report false.
    pub fn owns(&self, ptr: NonNull<u8>) -> bool {
        let addr = ptr.as_ptr() as Address;
        self.blocks.iter().any(|b| b.contains(addr))
    }

    fn alloc_small(&mut self, size: Size, aligned: bool) -> PoolResult<NonNull<u8>> {
        for idx in self.current..self.blocks.len() {
            if let Some(ptr) = self.blocks[idx].bump(size, aligned) {
                self.advance_cursor();
                return Ok(ptr);
            }
            // Age every block this request skipped over
            self.blocks[idx].note_failure();
        }
        self.grow(size, aligned)
    }

    /// Append a fresh block and serve the request from it
    fn grow(&mut self, size: Size, aligned: bool) -> PoolResult<NonNull<u8>> {
        let block = Block::new(self.block_size, 0)?;
        self.blocks.push(block);
        self.advance_cursor();

        debug!(
            "Pool grew to {} blocks ({} bytes each), scan cursor at {}",
            self.blocks.len(),
            self.block_size,
            self.current
        );

        let last = self.blocks.len() - 1;
        // A fresh block always fits a request bounded by `max`
        self.blocks[last]
            .bump(size, aligned)
            .ok_or(PoolError::OutOfMemory { requested: size })
    }

    /// Move the scan cursor past leading blocks that have missed too many
    /// requests, so chronically-full blocks stop being re-scanned
    fn advance_cursor(&mut self) {
        while self.current + 1 < self.blocks.len()
            && self.blocks[self.current].failures() > MAX_BLOCK_FAILURES
        {
            self.current += 1;
        }
    }

    fn alloc_large(&mut self, size: Size) -> PoolResult<NonNull<u8>> {
        let layout = Layout::from_size_align(size, POOL_ALIGNMENT)
            .map_err(|_| PoolError::OutOfMemory { requested: size })?;
        self.track_large(layout)
    }

    fn track_large(&mut self, layout: Layout) -> PoolResult<NonNull<u8>> {
        let raw = unsafe { alloc(layout) };
        let ptr = NonNull::new(raw).ok_or(PoolError::OutOfMemory {
            requested: layout.size(),
        })?;
        self.large.push(LargeAlloc { ptr, layout });
        trace!("Large allocation: {} bytes at {:p}", layout.size(), raw);
        Ok(ptr)
    }

    /// Cleanups first (LIFO), then large allocations
    fn teardown(&mut self) {
        for cleanup in self.cleanups.drain(..).rev() {
            cleanup();
        }
        for record in self.large.drain(..) {
            unsafe { dealloc(record.ptr.as_ptr(), record.layout) };
        }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.teardown();
        // Block memory is released as the vector drops
    }
}
