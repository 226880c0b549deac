/*!
 * Allocator Limits and Constants
 *
 * Centralized location for allocator-wide limits, thresholds, and defaults.
 */

// =============================================================================
// ARENA POOL
// =============================================================================

/// Largest request served by bump allocation (just under one page)
/// Anything bigger goes straight to the large-allocation path
pub const MAX_ALLOC_FROM_POOL: usize = 4096 - 1;

/// Default pool block size (16KB)
pub const DEFAULT_POOL_SIZE: usize = 16 * 1024;

/// Alignment of block and large-allocation memory
pub const POOL_ALIGNMENT: usize = 16;

/// Bump cursor alignment for aligned allocations
pub const DEFAULT_ALIGNMENT: usize = std::mem::size_of::<usize>();

/// Missed requests before the scan cursor skips a block
/// Avoids re-scanning chronically-full blocks on every request
pub const MAX_BLOCK_FAILURES: u32 = 4;

// =============================================================================
// POOL CACHE AGENT
// =============================================================================

/// Cache capacity when configured as zero
pub const DEFAULT_MAX_CACHE_N: usize = 100_000;

/// Cached pool size when configured as zero (4KB)
pub const DEFAULT_AGENT_POOL_SIZE: usize = 4096;

/// Pre-allocation count when configured as zero
pub const DEFAULT_PRE_ALLOC_N: usize = 1000;

// =============================================================================
// SLAB OBJECT POOL
// =============================================================================

/// Slab chunk size (64KB)
pub const OBJECT_MEM_SIZE: usize = 64 * 1024;

/// Round `n` up to the next multiple of `align` (`align` a power of two)
pub(crate) const fn align_up(n: usize, align: usize) -> usize {
    (n + align - 1) & !(align - 1)
}
