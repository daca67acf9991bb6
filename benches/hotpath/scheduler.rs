//! Benchmarks for the soft-timer scheduler.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use meadow_seq::{engine::Scheduler, Ticks};

use crate::TIMER_COUNTS;

pub fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("hotpath/scheduler");

    for &count in TIMER_COUNTS {
        // Pass where nothing is due
        let mut scheduler = Scheduler::new();
        for i in 0..count {
            scheduler.add(1_000 + i as u32, i);
        }
        group.bench_with_input(BenchmarkId::new("idle_pass", count), &count, |b, _| {
            b.iter(|| scheduler.process(black_box(Ticks(1)), |tag| {
                black_box(tag);
            }))
        });

        // Pass where every timer fires
        let mut scheduler = Scheduler::new();
        for i in 0..count {
            scheduler.add(1, i);
        }
        let mut now = Ticks(0);
        group.bench_with_input(BenchmarkId::new("all_due", count), &count, |b, _| {
            b.iter(|| {
                now = now.offset(1);
                scheduler.process(black_box(now), |tag| {
                    black_box(tag);
                })
            })
        });
    }

    group.finish();
}
