// Copyright 2025 the Cleat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use cleat_index::BandIndex;
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Point;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_points(count: usize, width: f64, height: f64) -> Vec<Point> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        out.push(Point::new(rng.next_f64() * width, rng.next_f64() * height));
    }
    out
}

// Ports on a canvas cluster into horizontal runs: stacks of blocks produce
// many entries sharing nearly the same y.
fn gen_banded_points(n_bands: usize, per_band: usize, band_gap: f64, width: f64) -> Vec<Point> {
    let mut out = Vec::with_capacity(n_bands * per_band);
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    for b in 0..n_bands {
        let y = b as f64 * band_gap;
        for _ in 0..per_band {
            out.push(Point::new(rng.next_f64() * width, y));
        }
    }
    out
}

fn build_index(pts: &[Point]) -> BandIndex<u32> {
    let mut idx = BandIndex::new();
    for (i, p) in pts.iter().enumerate() {
        idx.insert(i as u32, *p);
    }
    idx
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &[1_000usize, 4_000, 16_000] {
        let pts = gen_random_points(n, 4000.0, 4000.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("random_n{}", n), |b| {
            b.iter_batched(
                BandIndex::<u32>::new,
                |mut idx| {
                    for (i, p) in pts.iter().enumerate() {
                        idx.insert(i as u32, *p);
                    }
                    black_box(idx.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    let pts = gen_banded_points(100, 40, 30.0, 4000.0);
    group.throughput(Throughput::Elements(pts.len() as u64));
    group.bench_function("banded_equal_y_runs", |b| {
        b.iter_batched(
            BandIndex::<u32>::new,
            |mut idx| {
                for (i, p) in pts.iter().enumerate() {
                    idx.insert(i as u32, *p);
                }
                black_box(idx.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest");
    for &n in &[1_000usize, 4_000, 16_000] {
        let pts = gen_random_points(n, 4000.0, 4000.0);
        let idx = build_index(&pts);
        let origins = gen_random_points(512, 4000.0, 4000.0);
        group.throughput(Throughput::Elements(origins.len() as u64));
        group.bench_function(format!("snap_radius_15_n{}", n), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for o in &origins {
                    if idx.nearest(*o, 15.0).key.is_some() {
                        hits += 1;
                    }
                }
                black_box(hits);
            })
        });
        group.bench_function(format!("filtered_every_third_n{}", n), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for o in &origins {
                    if idx.nearest_where(*o, 50.0, |k| k % 3 == 0).key.is_some() {
                        hits += 1;
                    }
                }
                black_box(hits);
            })
        });
    }
    group.finish();
}

fn bench_move_churn(c: &mut Criterion) {
    // A drag re-seats every moved port: remove, shift, reinsert.
    let mut group = c.benchmark_group("move_churn");
    for &n in &[1_000usize, 8_000] {
        let pts = gen_random_points(n, 4000.0, 4000.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("remove_reinsert_n{}", n), |b| {
            b.iter_batched(
                || (build_index(&pts), pts.clone()),
                |(mut idx, mut live)| {
                    for (i, p) in live.iter_mut().enumerate() {
                        idx.remove(i as u32, *p).unwrap();
                        p.y += 7.0;
                        idx.insert(i as u32, *p);
                    }
                    black_box(idx.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_in_radius(c: &mut Criterion) {
    let mut group = c.benchmark_group("in_radius");
    let pts = gen_banded_points(200, 40, 25.0, 4000.0);
    let idx = build_index(&pts);
    let origins = gen_random_points(256, 4000.0, 5000.0);
    group.throughput(Throughput::Elements(origins.len() as u64));
    group.bench_function("neighbour_scan_r15", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for o in &origins {
                total += idx.in_radius(*o, 15.0).len();
            }
            black_box(total);
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_nearest,
    bench_move_churn,
    bench_in_radius
);
criterion_main!(benches);
