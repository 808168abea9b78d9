use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use msgpipe::prelude::*;
use std::sync::Arc;
use tokio::runtime::Runtime;

const MESSAGES: usize = 10_000;

fn payloads(count: usize, keys: usize) -> Vec<KeyedPayload> {
    (0..count)
        .map(|i| KeyedPayload {
            key: format!("key-{}", i % keys),
            bytes: (i % 64) as u64,
        })
        .collect()
}

/// Buffered, sharded pipeline fed one message at a time by the driver
fn bench_sharded_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("sharded_pipeline");
    group.throughput(Throughput::Elements(MESSAGES as u64));
    let runtime = Runtime::new().unwrap();

    for shards in [1, 2, 4, 8, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(shards), &shards, |b, &shards| {
            b.to_async(&runtime).iter_batched(
                || payloads(MESSAGES, 1_000),
                |values| async move {
                    let store = Arc::new(TallyStore::new());
                    let sinks = (0..shards).map(|_| TallySink::new(Arc::clone(&store)));
                    let sharded = Sharded::with_key_fn(
                        |payload: &KeyedPayload| Ok(payload.key.as_bytes().to_vec()),
                        sinks,
                    )
                    .unwrap();
                    let driver = MsgStream::new(Buffered::new(sharded, 256));

                    let mut source = futures::stream::iter(
                        values.into_iter().map(|value| Envelope::new(value).boxed()),
                    );
                    driver.run(&mut source, &CancellationToken::new()).await;
                    driver.root().flush().await.unwrap();

                    black_box(store.total_messages())
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Cost of the buffer threshold alone, without fan-out
fn bench_buffer_capacity(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer_capacity");
    group.throughput(Throughput::Elements(MESSAGES as u64));
    let runtime = Runtime::new().unwrap();

    for capacity in [1, 16, 256, 4_096] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                b.to_async(&runtime).iter_batched(
                    || payloads(MESSAGES, 100),
                    |values| async move {
                        let store = Arc::new(TallyStore::new());
                        let root = Buffered::new(TallySink::new(Arc::clone(&store)), capacity);

                        for value in values {
                            root.process(vec![Envelope::new(value).boxed()]).await.unwrap();
                        }
                        root.flush().await.unwrap();

                        black_box(store.len())
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_shard_index(c: &mut Criterion) {
    let keys: Vec<String> = (0..1_000).map(|i| format!("customer-{i}")).collect();

    c.bench_function("shard_index", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(shard_index(black_box(key.as_bytes()), 16));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_sharded_pipeline,
    bench_buffer_capacity,
    bench_shard_index
);
criterion_main!(benches);
