use boundlru::{LruCache, SyncStore};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_cached_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_get");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_1kb_bare", |b| {
        let mut cache = LruCache::new(1000);
        let data = vec![b'x'; 1024];
        for id in 0..100u64 {
            cache.put(id, data.clone());
        }

        let mut counter = 0u64;
        b.iter(|| {
            black_box(cache.get(&(counter % 100)));
            counter += 1;
        });
    });

    group.bench_function("get_1kb_wrapped", |b| {
        let cache: SyncStore<u64, Vec<u8>> = SyncStore::lru(1000).unwrap();
        let data = vec![b'x'; 1024];
        for id in 0..100u64 {
            cache.put(id, data.clone());
        }

        let mut counter = 0u64;
        b.iter(|| {
            black_box(cache.get(&(counter % 100)));
            counter += 1;
        });
    });

    group.bench_function("get_1kb_double_wrapped", |b| {
        let inner: SyncStore<u64, Vec<u8>> = SyncStore::lru(1000).unwrap();
        let cache = SyncStore::new(inner);
        let data = vec![b'x'; 1024];
        for id in 0..100u64 {
            cache.put(id, data.clone());
        }

        let mut counter = 0u64;
        b.iter(|| {
            black_box(cache.get(&(counter % 100)));
            counter += 1;
        });
    });

    group.finish();
}

fn bench_mixed_50_50(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("50_read_50_write_wrapped", |b| {
        let cache: SyncStore<u64, Vec<u8>> = SyncStore::lru(1000).unwrap();
        let data = vec![b'x'; 1024];
        for id in 0..100u64 {
            cache.put(id, data.clone());
        }

        let mut counter = 0u64;
        b.iter(|| {
            if counter.is_multiple_of(2) {
                black_box(cache.get(&(counter % 100)));
            } else {
                cache.put(100 + counter, data.clone());
            }
            counter += 1;
        });
    });

    group.finish();
}

fn bench_cache_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_miss");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_miss_then_fill", |b| {
        let mut cache = LruCache::new(10); // Small cache
        let data = vec![b'x'; 1024];

        let mut counter = 0u64;
        b.iter(|| {
            // Cycling 100 keys through 10 slots guarantees misses
            let key = counter % 100;
            if cache.get(&key).is_none() {
                cache.put(key, data.clone());
            }
            counter += 1;
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_cached_get,
    bench_mixed_50_50,
    bench_cache_miss
);
criterion_main!(benches);
