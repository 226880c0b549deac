/*!
 * Pool Cache Agent
 *
 * Bounded LIFO cache of idle pools. Turns acquire/release into a cache
 * hit/miss problem instead of create/destroy churn: pool creation cost is
 * dominated by the first block's system allocation, and a bounded cache
 * amortizes it under steady request-response workloads while the cap
 * prevents unbounded retention during load spikes.
 */

use crate::arena::Pool;
use crate::core::limits::{DEFAULT_AGENT_POOL_SIZE, DEFAULT_MAX_CACHE_N, DEFAULT_PRE_ALLOC_N};
use crate::core::traits::Dump;
use crate::core::types::{PoolResult, Size};
use log::{info, trace, warn};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Advance a usage counter, wrapping at the maximum representable value
///
/// The wrap is an explicit modulo, one step short of `u64::MAX`, not
/// natural unsigned overflow.
fn wrap(counter: u64) -> u64 {
    (counter + 1) % u64::MAX
}

/// Read-only snapshot of agent configuration and usage counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStats {
    pub max_cache_n: usize,
    pub cur_cache_n: usize,
    pub pool_size: Size,
    pub pre_alloc_n: usize,
    pub from_caches: u64,
    pub from_mems: u64,
    pub allocs: u64,
    pub frees: u64,
}

/// Bounded cache of idle, already-reset pools
///
/// Every pool in the cache uses the same nominal block size. Acquire
/// transfers ownership out to the caller; release transfers it back.
pub struct PoolCacheAgent {
    cache_list: Vec<Pool>,
    max_cache_n: usize,
    pool_size: Size,
    pre_alloc_n: usize,
    from_caches: u64,
    from_mems: u64,
    allocs: u64,
    frees: u64,
}

impl PoolCacheAgent {
    /// Create an agent, eagerly filling the cache with `pre_alloc_n` pools
    ///
    /// Zero for any argument selects the default: 100000 cached pools,
    /// 4096 byte pools, 1000 pre-allocated. Pre-allocation failures are
    /// skipped rather than fatal; the cache is simply left shorter.
    /// Pre-allocation never exceeds `max_cache_n`.
    pub fn new(max_cache_n: usize, pool_size: Size, pre_alloc_n: usize) -> Self {
        let max_cache_n = if max_cache_n == 0 {
            DEFAULT_MAX_CACHE_N
        } else {
            max_cache_n
        };
        let pool_size = if pool_size == 0 {
            DEFAULT_AGENT_POOL_SIZE
        } else {
            pool_size
        };
        let pre_alloc_n = if pre_alloc_n == 0 {
            DEFAULT_PRE_ALLOC_N
        } else {
            pre_alloc_n
        };

        let mut cache_list = Vec::with_capacity(pre_alloc_n.min(max_cache_n));
        for _ in 0..pre_alloc_n.min(max_cache_n) {
            match Pool::create(pool_size) {
                Ok(pool) => cache_list.push(pool),
                Err(err) => warn!("Pool pre-allocation skipped: {}", err),
            }
        }

        info!(
            "Pool cache agent initialized: {} pre-allocated, {} byte pools, cap {}",
            cache_list.len(),
            pool_size,
            max_cache_n
        );

        Self {
            cache_list,
            max_cache_n,
            pool_size,
            pre_alloc_n,
            from_caches: 0,
            from_mems: 0,
            allocs: 0,
            frees: 0,
        }
    }

    /// Hand out a pool: most recently cached first, freshly created on miss
    ///
    /// Cached pools are reset again before handout to tolerate callers
    /// that released dirty pools.
    pub fn acquire(&mut self) -> PoolResult<Pool> {
        let result = match self.cache_list.pop() {
            Some(mut pool) => {
                self.from_caches = wrap(self.from_caches);
                pool.reset();
                trace!("Pool acquired from cache ({} remain)", self.cache_list.len());
                Ok(pool)
            }
            None => {
                self.from_mems = wrap(self.from_mems);
                trace!("Pool cache empty, creating {} byte pool", self.pool_size);
                Pool::create(self.pool_size)
            }
        };
        self.allocs = wrap(self.allocs);
        result
    }

    /// Take a pool back: reset and cache it while below the cap, destroy
    /// it otherwise
    pub fn release(&mut self, mut pool: Pool) {
        if self.cache_list.len() < self.max_cache_n {
            pool.reset();
            self.cache_list.push(pool);
            trace!("Pool released to cache ({} cached)", self.cache_list.len());
        } else {
            trace!("Pool cache full, destroying released pool");
            pool.destroy();
        }
        self.frees = wrap(self.frees);
    }

    /// Read-only snapshot of configuration and counters
    pub fn stats(&self) -> AgentStats {
        AgentStats {
            max_cache_n: self.max_cache_n,
            cur_cache_n: self.cache_list.len(),
            pool_size: self.pool_size,
            pre_alloc_n: self.pre_alloc_n,
            from_caches: self.from_caches,
            from_mems: self.from_mems,
            allocs: self.allocs,
            frees: self.frees,
        }
    }

    /// Emit the counters as one log line
    pub fn log_stats(&self) {
        let s = self.stats();
        info!(
            "MaxCaches:{},CurCaches:{},PSize:{},PreAllocs:{},FromCaches:{},FromMems:{},allocs:{},frees:{}",
            s.max_cache_n,
            s.cur_cache_n,
            s.pool_size,
            s.pre_alloc_n,
            s.from_caches,
            s.from_mems,
            s.allocs,
            s.frees
        );
    }
}

impl Dump for PoolCacheAgent {
    fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
        let s = self.stats();
        writeln!(
            out,
            "MaxCaches:{},CurCaches:{},PSize:{},PreAllocs:{},FromCaches:{},FromMems:{},allocs:{},frees:{}",
            s.max_cache_n,
            s.cur_cache_n,
            s.pool_size,
            s.pre_alloc_n,
            s.from_caches,
            s.from_mems,
            s.allocs,
            s.frees
        )?;
        out.flush()
    }
}
