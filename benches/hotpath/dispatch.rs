//! Benchmarks for the event path: post, dequeue, handle.

use std::hint::black_box;

use criterion::Criterion;
use meadow_seq::{
    events::EventQueue,
    io::{mock::MockHardware, GridKey},
    Config, Event, Firmware, Ticks,
};

pub fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("hotpath/dispatch");

    let (mut queue, mut sender) = EventQueue::new(32, 4);
    group.bench_function("queue_round_trip", |b| {
        b.iter(|| {
            sender.post(black_box(Event::KnobPoll));
            queue.post(black_box(Event::ButtonPoll));
            black_box(queue.next());
            black_box(queue.next());
        })
    });

    // External clock edge through the full handler (jitter + triggers)
    let mut hw = MockHardware::new();
    hw.cable_present = true;
    let (mut firmware, mut irq) = Firmware::new(hw, Config::default()).expect("default config");
    for step in 0..16 {
        let key = GridKey {
            x: step,
            y: step % 8,
            pressed: true,
        };
        firmware.post(Event::GridKey(key));
    }
    firmware.drain();
    let mut t = 0u32;
    let mut high = false;
    group.bench_function("external_edge", |b| {
        b.iter(|| {
            t = t.wrapping_add(60);
            high = !high;
            irq.post(Event::ExternalClock { high, at: Ticks(t) });
            black_box(firmware.dispatch_next());
        })
    });

    group.finish();
}
