// SPDX-License-Identifier: MIT

//! Benchmark for expiry classification, the hot path of every scan.

use absher_agent::services::expiry::classify;
use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn bench_classify(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
    let expiries: Vec<_> = (-30..30)
        .map(|offset| now + Duration::days(offset) + Duration::hours(offset % 7))
        .collect();

    c.bench_function("classify_60_services", |b| {
        b.iter(|| {
            for expiry in &expiries {
                black_box(classify(black_box(*expiry), black_box(now), 3));
            }
        })
    });
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
