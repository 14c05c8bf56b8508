use algo_reference::{Matrix, Reduction, Stride, WorkerPool, reduce, reduce_threaded};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

const INPUT_SIZES: &[(&str, usize)] = &[("n256", 256), ("n1k", 1024), ("n4k", 4096)];

const WINDOW: usize = 2;

#[inline]
fn next_u64(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x >> 12;
    x ^= x << 25;
    x ^= x >> 27;
    *state = x;
    x.wrapping_mul(0x2545_F491_4F6C_DD1D)
}

fn make_grid(n: usize, seed: u64) -> Matrix<f64> {
    let mut state = seed;
    Matrix::from_fn(n, n, |_, _| (next_u64(&mut state) % 100) as f64)
}

fn bench_reduce(c: &mut Criterion) {
    let pool = WorkerPool::available();
    for (name, reduction) in [("reduce_max", Reduction::Max), ("reduce_mean", Reduction::Mean)] {
        let mut group = c.benchmark_group(name);
        for &(label, n) in INPUT_SIZES {
            group.throughput(Throughput::Elements((n * n) as u64));
            let input = make_grid(n, 0xDEAD_BEEF_0000_0001 ^ n as u64);

            group.bench_function(BenchmarkId::new("serial", label), |b| {
                b.iter(|| reduce(black_box(&input), WINDOW, reduction, Stride::Tiled).unwrap());
            });
            group.bench_function(BenchmarkId::new("threaded", label), |b| {
                b.iter(|| {
                    reduce_threaded(black_box(&input), WINDOW, reduction, Stride::Tiled, &pool)
                        .unwrap()
                });
            });
            group.bench_function(BenchmarkId::new("sliding", label), |b| {
                b.iter(|| reduce(black_box(&input), WINDOW, reduction, Stride::Sliding).unwrap());
            });
        }
        group.finish();
    }
}

criterion_group!(benches, bench_reduce);
criterion_main!(benches);
