/*!
 * Slab Object Pool
 *
 * Fixed-size slots carved from large chunks and recycled individually
 * through an explicit free list. Unlike pool memory, which is reclaimed
 * in bulk at reset/destroy, slots are meant to be returned and reused at
 * high frequency, and all share one size - a free-list slab is simpler
 * and cheaper here than routing through the bump allocator.
 */

mod chunk;

use crate::core::limits::{align_up, DEFAULT_ALIGNMENT, OBJECT_MEM_SIZE};
use crate::core::traits::Dump;
use crate::core::types::{PoolError, PoolResult, Size};
use chunk::Chunk;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::ptr::NonNull;

/// Per-slot initializer, run exactly once when the slot is carved
///
/// Shared state belongs in the closure capture.
pub type ObjectInit = Box<dyn FnMut(NonNull<u8>)>;

/// Read-only snapshot of slab pool counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabStats {
    pub n_objects: usize,
    pub n_mms: usize,
    pub n_frees: usize,
    pub n_using: usize,
    pub object_limits: usize,
    pub object_size: Size,
}

/// Fixed-size object pool over independently allocated chunks
pub struct SlabPool {
    mm_list: Vec<Chunk>,
    free_list: Vec<NonNull<u8>>,
    obj_init: Option<ObjectInit>,
    object_limits: usize,
    object_size: Size,
    n_objects: usize,
    n_mms: usize,
    n_frees: usize,
    n_using: usize,
}

impl SlabPool {
    /// Create an empty pool for up to `object_limits` slots of
    /// `object_size` bytes
    ///
    /// The slot size is rounded up to pointer alignment; zero is an
    /// error. `obj_init` runs exactly once per slot, at carve time -
    /// there is no matching per-slot teardown hook.
    pub fn create(
        object_limits: usize,
        object_size: Size,
        obj_init: Option<ObjectInit>,
    ) -> PoolResult<Self> {
        if object_size == 0 {
            return Err(PoolError::InvalidObjectSize);
        }
        let object_size = align_up(object_size, DEFAULT_ALIGNMENT);
        debug!(
            "Slab pool created: {} byte slots, {} slot cap",
            object_size, object_limits
        );
        Ok(Self {
            mm_list: Vec::new(),
            free_list: Vec::new(),
            obj_init,
            object_limits,
            object_size,
            n_objects: 0,
            n_mms: 0,
            n_frees: 0,
            n_using: 0,
        })
    }

    /// Hand out one slot
    ///
    /// Recycles the most recently returned slot first; carves a fresh
    /// chunk when the free list is empty and the cap allows. `Ok(None)`
    /// signals capacity exhaustion - an expected, recoverable condition.
    /// A system allocation failure while carving propagates as an error.
    pub fn get(&mut self) -> PoolResult<Option<NonNull<u8>>> {
        if let Some(slot) = self.free_list.pop() {
            self.n_using += 1;
            return Ok(Some(slot));
        }
        if self.n_objects >= self.object_limits {
            trace!(
                "Slab pool exhausted: {} of {} slots in use",
                self.n_using,
                self.object_limits
            );
            return Ok(None);
        }

        // Carve a fresh chunk, but never past the slot cap
        let carve = (OBJECT_MEM_SIZE / self.object_size)
            .min(self.object_limits - self.n_objects)
            .max(1);
        let chunk = Chunk::new(carve, self.object_size)?;

        if let Some(init) = self.obj_init.as_mut() {
            for idx in 0..carve {
                init(chunk.slot(idx));
            }
        }
        for idx in 1..carve {
            self.free_list.push(chunk.slot(idx));
        }
        let slot = chunk.slot(0);
        self.mm_list.push(chunk);

        self.n_mms += 1;
        self.n_objects += carve;
        self.n_using += 1;

        debug!(
            "Slab chunk carved: {} slots ({} total across {} chunks)",
            carve, self.n_objects, self.n_mms
        );
        Ok(Some(slot))
    }

    /// Return a slot to the free list
    ///
    /// The pool does not verify that `obj` came from one of its chunks;
    /// that is the caller's contract. Resources owned by the slot must be
    /// released before the final `put` - pool teardown frees chunk memory
    /// only.
    pub fn put(&mut self, obj: NonNull<u8>) {
        self.free_list.push(obj);
        self.n_frees += 1;
        self.n_using = self.n_using.saturating_sub(1);
    }

    /// Consume the pool, releasing every chunk
    ///
    /// No per-object teardown runs.
    pub fn destroy(self) {}

    /// Read-only snapshot of counters and configuration
    pub fn stats(&self) -> SlabStats {
        SlabStats {
            n_objects: self.n_objects,
            n_mms: self.n_mms,
            n_frees: self.n_frees,
            n_using: self.n_using,
            object_limits: self.object_limits,
            object_size: self.object_size,
        }
    }

    /// Slot size after internal rounding
    pub fn object_size(&self) -> Size {
        self.object_size
    }
}

impl Dump for SlabPool {
    fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
        let s = self.stats();
        writeln!(
            out,
            "Objects:{},Mems:{},Frees:{},Using:{},Limits:{},ObjectSize:{}",
            s.n_objects, s.n_mms, s.n_frees, s.n_using, s.object_limits, s.object_size
        )?;
        out.flush()
    }
}
