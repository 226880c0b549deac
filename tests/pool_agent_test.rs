/*!
 * Pool Cache Agent Tests
 * Cache hit/miss accounting, the cache bound, and stats snapshots
 */

use poolkit::{Dump, PoolCacheAgent};
use pretty_assertions::assert_eq;

#[test]
fn test_zero_arguments_select_defaults() {
    let agent = PoolCacheAgent::new(0, 0, 0);
    let s = agent.stats();

    assert_eq!(s.max_cache_n, 100_000);
    assert_eq!(s.pool_size, 4096);
    assert_eq!(s.pre_alloc_n, 1000);
    assert_eq!(s.cur_cache_n, 1000, "Pre-allocation should fill the cache");
    assert_eq!(s.allocs, 0);
    assert_eq!(s.frees, 0);
}

#[test]
fn test_acquire_prefers_cache() {
    let mut agent = PoolCacheAgent::new(4, 1024, 2);

    let pool = agent.acquire().expect("Failed to acquire");
    let s = agent.stats();
    assert_eq!(s.cur_cache_n, 1);
    assert_eq!(s.from_caches, 1);
    assert_eq!(s.from_mems, 0);
    assert_eq!(s.allocs, 1);

    agent.release(pool);
    let s = agent.stats();
    assert_eq!(s.cur_cache_n, 2);
    assert_eq!(s.frees, 1);
}

#[test]
fn test_empty_cache_falls_back_to_creation() {
    let mut agent = PoolCacheAgent::new(4, 1024, 1);

    let first = agent.acquire().expect("Failed to acquire cached");
    let second = agent.acquire().expect("Failed to acquire fresh");

    let s = agent.stats();
    assert_eq!(s.cur_cache_n, 0);
    assert_eq!(s.from_caches, 1);
    assert_eq!(s.from_mems, 1);
    assert_eq!(s.allocs, 2);

    agent.release(first);
    agent.release(second);
}

#[test]
fn test_acquire_release_round_trip_keeps_cache_size() {
    let mut agent = PoolCacheAgent::new(8, 1024, 3);
    let before = agent.stats().cur_cache_n;

    let pool = agent.acquire().expect("Failed to acquire");
    agent.release(pool);

    assert_eq!(agent.stats().cur_cache_n, before);
}

#[test]
fn test_cache_bound_is_enforced() {
    let mut agent = PoolCacheAgent::new(2, 1024, 1);

    let p1 = agent.acquire().expect("Failed to acquire p1");
    let p2 = agent.acquire().expect("Failed to acquire p2");
    let p3 = agent.acquire().expect("Failed to acquire p3");

    let s = agent.stats();
    assert_eq!(s.from_caches, 1);
    assert_eq!(s.from_mems, 2);
    assert_eq!(s.allocs, 3);

    agent.release(p1);
    agent.release(p2);
    agent.release(p3);

    let s = agent.stats();
    assert_eq!(s.cur_cache_n, 2, "Third release should destroy, not cache");
    assert_eq!(s.frees, 3);
}

#[test]
fn test_pre_allocation_never_exceeds_cap() {
    let agent = PoolCacheAgent::new(2, 1024, 50);
    let s = agent.stats();
    assert_eq!(s.cur_cache_n, 2);
    assert_eq!(s.max_cache_n, 2);
}

#[test]
fn test_released_pools_come_back_reset() {
    let mut agent = PoolCacheAgent::new(2, 4096, 1);

    let mut pool = agent.acquire().expect("Failed to acquire");
    pool.alloc(3000).expect("Failed to allocate");
    pool.alloc(5000).expect("Failed to allocate large");
    assert_eq!(pool.large_count(), 1);

    agent.release(pool);
    let pool = agent.acquire().expect("Failed to re-acquire");
    assert_eq!(pool.large_count(), 0, "Cached pool should come back reset");
    agent.release(pool);
}

#[test]
fn test_stats_snapshot_serializes() {
    let agent = PoolCacheAgent::new(2, 1024, 1);
    let json = serde_json::to_string(&agent.stats()).expect("Stats should serialize");
    assert!(json.contains("\"cur_cache_n\":1"));
    assert!(json.contains("\"max_cache_n\":2"));
}

#[test]
fn test_dump_writes_counters() {
    let mut agent = PoolCacheAgent::new(2, 1024, 1);

    let pool = agent.acquire().expect("Failed to acquire");
    agent.release(pool);

    let mut out = Vec::new();
    agent.dump(&mut out).expect("Dump should succeed");
    let text = String::from_utf8(out).expect("Dump should be UTF-8");

    assert!(text.contains("MaxCaches:2"));
    assert!(text.contains("FromCaches:1"));
    assert!(text.contains("allocs:1"));
    assert!(text.contains("frees:1"));
}
