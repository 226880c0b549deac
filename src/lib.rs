/*!
 * Poolkit
 * Memory-management core: arena pools, pool caching, and slab object pools
 *
 * Three escalating strategies for avoiding allocator churn:
 * - bump-allocate short-lived objects from a [`Pool`] and free them all at
 *   once with `reset`
 * - reuse whole pools across request boundaries through the
 *   [`PoolCacheAgent`] instead of destroying and recreating them
 * - recycle individual fixed-size objects through a [`SlabPool`] without
 *   touching the arena machinery at all
 *
 * Every instance is single-owner and performs no internal locking; callers
 * needing shared access serialize externally, coarse-grained around the
 * whole instance.
 */

pub mod agent;
pub mod arena;
pub mod core;
pub mod slab;

// Re-exports
pub use crate::agent::{AgentStats, PoolCacheAgent};
pub use crate::arena::{Pool, MIN_POOL_SIZE};
pub use crate::core::traits::Dump;
pub use crate::core::types::{Address, PoolError, PoolResult, Size};
pub use crate::slab::{ObjectInit, SlabPool, SlabStats};
