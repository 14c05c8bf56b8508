use std::cell::RefCell;

use algo_reference::merge_sort;
use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};

const INPUT_SIZES: &[(&str, usize)] = &[
    ("l1_8k", 8 * 1024),
    ("l2_64k", 64 * 1024),
    ("l3_1m", 1024 * 1024),
];

#[inline]
fn next_u64(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x >> 12;
    x ^= x << 25;
    x ^= x >> 27;
    *state = x;
    x.wrapping_mul(0x2545_F491_4F6C_DD1D)
}

fn make_input(len: usize, seed: u64) -> Vec<i32> {
    let mut state = seed;
    (0..len).map(|_| next_u64(&mut state) as u32 as i32).collect()
}

fn bench_merge_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_sort");
    for &(label, len) in INPUT_SIZES {
        group.throughput(Throughput::Elements(len as u64));
        let input = make_input(len, 0x0123_4567_89AB_CDEF ^ len as u64);
        let data = RefCell::new(input.clone());

        group.bench_function(BenchmarkId::new("merge_sort", label), |b| {
            b.iter_batched(
                || data.borrow_mut().copy_from_slice(&input),
                |()| merge_sort(black_box(&mut data.borrow_mut()[..])),
                BatchSize::LargeInput,
            )
        });

        let data = RefCell::new(input.clone());
        group.bench_function(BenchmarkId::new("std_sort", label), |b| {
            b.iter_batched(
                || data.borrow_mut().copy_from_slice(&input),
                |()| black_box(&mut data.borrow_mut()[..]).sort(),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_merge_sort);
criterion_main!(benches);
