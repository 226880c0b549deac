/*!
 * Pool Benchmarks
 *
 * Compare bump allocation, cached pool reuse, and slab recycling
 */

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use poolkit::{Pool, PoolCacheAgent, SlabPool};

fn bench_bump_alloc(c: &mut Criterion) {
    c.bench_function("bump_alloc_64b_x64", |b| {
        let mut pool = Pool::create(64 * 1024).expect("create");
        b.iter(|| {
            pool.reset();
            for _ in 0..64 {
                black_box(pool.alloc(black_box(64)).expect("alloc"));
            }
        });
    });
}

fn bench_large_alloc(c: &mut Criterion) {
    c.bench_function("large_alloc_8k", |b| {
        let mut pool = Pool::create(4096).expect("create");
        b.iter(|| {
            let ptr = pool.alloc(black_box(8192)).expect("alloc");
            pool.free_large(black_box(ptr)).expect("free");
        });
    });
}

fn bench_agent_round_trip(c: &mut Criterion) {
    c.bench_function("agent_acquire_release", |b| {
        let mut agent = PoolCacheAgent::new(16, 4096, 4);
        b.iter(|| {
            let pool = agent.acquire().expect("acquire");
            agent.release(black_box(pool));
        });
    });
}

fn bench_slab_round_trip(c: &mut Criterion) {
    c.bench_function("slab_get_put", |b| {
        let mut pool = SlabPool::create(1024, 64, None).expect("create");
        b.iter(|| {
            let slot = pool.get().expect("get").expect("slot");
            pool.put(black_box(slot));
        });
    });
}

criterion_group!(
    benches,
    bench_bump_alloc,
    bench_large_alloc,
    bench_agent_round_trip,
    bench_slab_round_trip
);
criterion_main!(benches);
