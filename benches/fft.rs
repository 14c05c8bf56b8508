use algo_reference::fft::{Complex64, FftVariant, Radix4Plan, fft};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// Powers of four, so every variant accepts every size.
const INPUT_SIZES: &[(&str, usize)] = &[("n256", 256), ("n4k", 4096), ("n64k", 65536)];

#[inline]
fn next_u64(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x >> 12;
    x ^= x << 25;
    x ^= x >> 27;
    *state = x;
    x.wrapping_mul(0x2545_F491_4F6C_DD1D)
}

fn make_signal(len: usize, seed: u64) -> Vec<Complex64> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            let re = (next_u64(&mut state) & 0xFFFF) as f64 / 65536.0 - 0.5;
            let im = (next_u64(&mut state) & 0xFFFF) as f64 / 65536.0 - 0.5;
            Complex64::new(re, im)
        })
        .collect()
}

fn bench_fft(c: &mut Criterion) {
    let mut group = c.benchmark_group("fft");
    for &(label, len) in INPUT_SIZES {
        group.throughput(Throughput::Elements(len as u64));
        let input = make_signal(len, 0xF0F0_1234_ABCD_5678 ^ len as u64);
        let mut data = input.clone();

        for variant in FftVariant::ALL {
            let name = format!("{variant:?}").to_lowercase();
            group.bench_function(BenchmarkId::new(name, label), |b| {
                b.iter(|| {
                    data.copy_from_slice(&input);
                    fft(variant, black_box(&mut data)).unwrap();
                    black_box(data[1]);
                });
            });
        }

        let mut plan = Radix4Plan::new(len).unwrap();
        group.bench_function(BenchmarkId::new("radix4_plan", label), |b| {
            b.iter(|| {
                data.copy_from_slice(&input);
                plan.process(black_box(&mut data)).unwrap();
                black_box(data[1]);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fft);
criterion_main!(benches);
