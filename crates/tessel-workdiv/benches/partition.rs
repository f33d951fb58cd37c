//! Benchmarks for grid partitioning
//!
//! Covers the common shapes (1D vectors, 2D images, 3D volumes) and the worst
//! case for the divisor search: prime extents against large limits.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessel_workdiv::{compute_work_extent, largest_divisor_at_most, Block, Dim3, Extent3, HardwareLimits, HostWorkDiv, Threads, WorkDiv};

fn gpu_limits() -> HardwareLimits {
    HardwareLimits::new(Extent3::xyz(1024, 1024, 64), 1024)
}

fn benchmark_compute_work_extent(c: &mut Criterion) {
    let limits = gpu_limits();
    let mut group = c.benchmark_group("compute_work_extent");

    let shapes = [
        ("vector_1m", Extent3::xyz(1 << 20, 1, 1)),
        ("image_1080p", Extent3::xyz(1920, 1080, 1)),
        ("volume_256", Extent3::xyz(256, 256, 256)),
        ("prime_x", Extent3::xyz(1_000_003, 1, 1)),
    ];

    for (name, grid) in shapes {
        group.bench_with_input(BenchmarkId::from_parameter(name), &grid, |b, grid| {
            b.iter(|| {
                let work = compute_work_extent(black_box(*grid), black_box(&limits)).unwrap();
                black_box(work);
            })
        });
    }

    group.finish();
}

fn benchmark_divisor_search(c: &mut Criterion) {
    c.bench_function("largest_divisor_at_most/prime", |b| {
        b.iter(|| black_box(largest_divisor_at_most(black_box(1_000_003), black_box(1024))))
    });

    c.bench_function("largest_divisor_at_most/power_of_two", |b| {
        b.iter(|| black_box(largest_divisor_at_most(black_box(1 << 20), black_box(1024))))
    });
}

fn benchmark_stored_query(c: &mut Criterion) {
    let work = compute_work_extent(Extent3::xyz(1920, 1080, 1), &gpu_limits()).unwrap();
    let ctx = HostWorkDiv::new(work);

    c.bench_function("host_work_div/block_threads", |b| {
        b.iter(|| black_box(black_box(&ctx).work_div::<Block, Threads, Dim3>()))
    });
}

criterion_group!(
    benches,
    benchmark_compute_work_extent,
    benchmark_divisor_search,
    benchmark_stored_query
);
criterion_main!(benches);
