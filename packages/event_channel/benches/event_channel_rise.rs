//! Benchmarking the subscribe-rise-unsubscribe cycle of event channels.

#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use criterion::{Criterion, criterion_group, criterion_main};
use event_channel::{EventChannel, LocalEventChannel};

criterion_group!(benches, entrypoint);
criterion_main!(benches);

const HANDLER_COUNTS: &[usize] = &[1, 10, 100];

fn entrypoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_channel_rise");

    for &handler_count in HANDLER_COUNTS {
        let locking = EventChannel::<u64>::new();
        let local = LocalEventChannel::<u64>::new();
        let sum = Arc::new(AtomicU64::new(0));

        for _ in 0..handler_count {
            let locking_sum = Arc::clone(&sum);
            locking.subscribe(move |value: &u64| {
                locking_sum.fetch_add(*value, Ordering::Relaxed);
            });

            let local_sum = Arc::clone(&sum);
            local.subscribe(move |value: &u64| {
                local_sum.fetch_add(*value, Ordering::Relaxed);
            });
        }

        group.bench_function(format!("locking_{handler_count}_handlers"), |b| {
            b.iter(|| locking.rise(black_box(1)));
        });

        group.bench_function(format!("non_locking_{handler_count}_handlers"), |b| {
            b.iter(|| local.rise(black_box(1)));
        });
    }

    group.finish();

    let mut group = c.benchmark_group("event_channel_subscription");

    let locking = EventChannel::<u64>::new();
    group.bench_function("locking_subscribe_unsubscribe", |b| {
        b.iter(|| {
            let id = locking.subscribe(|value: &u64| {
                black_box(value);
            });
            locking.unsubscribe(black_box(id));
        });
    });

    let local = LocalEventChannel::<u64>::new();
    group.bench_function("non_locking_subscribe_once_rise", |b| {
        b.iter(|| {
            local.subscribe_once(|value: &u64| {
                black_box(value);
            });
            local.rise(black_box(1));
        });
    });

    group.finish();
}
