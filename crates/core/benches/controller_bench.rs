//! Controller hot-path benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pacer_core::{DebounceConfig, DebounceController, ManualTimer};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn bench_admit(c: &mut Criterion) {
    let trailing = Arc::new(DebounceConfig::from_millis(200).unwrap());
    let leading = Arc::new(
        DebounceConfig::from_millis(200)
            .unwrap()
            .fire_on_first(true),
    );

    c.bench_function("admit_burst_trailing", |b| {
        let t0 = Instant::now();
        b.iter(|| {
            let mut ctl = DebounceController::new(trailing.clone(), ManualTimer::new());
            for i in 0..1_000u64 {
                black_box(ctl.admit(t0 + Duration::from_micros(i), i));
            }
            black_box(ctl.take_due(t0 + Duration::from_secs(1)))
        });
    });

    c.bench_function("admit_spaced_leading", |b| {
        let t0 = Instant::now();
        b.iter(|| {
            let mut ctl = DebounceController::new(leading.clone(), ManualTimer::new());
            for i in 0..1_000u64 {
                black_box(ctl.admit(t0 + Duration::from_millis(i * 250), i));
            }
        });
    });
}

criterion_group!(benches, bench_admit);
criterion_main!(benches);
