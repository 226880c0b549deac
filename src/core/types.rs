/*!
 * Core Types
 * Common types and errors shared across the allocator
 */

use thiserror::Error;

/// Size type for allocation requests
pub type Size = usize;

/// Address type for raw memory locations
pub type Address = usize;

/// Pool operation result
pub type PoolResult<T> = Result<T, PoolError>;

/// Allocator errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Out of memory: system allocator refused {requested} bytes")]
    OutOfMemory { requested: Size },

    #[error("Invalid free: 0x{0:x} is not a tracked large allocation")]
    InvalidFree(Address),

    #[error("Bad alignment: {alignment} is not a power of two")]
    BadAlignment { alignment: Size },

    #[error("Invalid object size: slab slots must be at least one byte")]
    InvalidObjectSize,
}
