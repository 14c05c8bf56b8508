//! Runs one kernel in a tight loop on deterministic input, for use under a
//! profiler (`perf record`, Instruments, `samply`).
//!
//! ```bash
//! cargo run --release --bin perf_harness -- --bench matmul_blocked --len 512 --report
//! cargo run --release --bin perf_harness -- --bench fft_radix4_plan --len 65536 --verify
//! cargo run --release --bin perf_harness -- --list
//! ```

use std::hint::black_box;
use std::process;
use std::time::{Duration, Instant};

use algo_reference::fft::{Complex64, FftVariant, Radix4Plan, dft, fft};
use algo_reference::nested_sampling::{self, DEFAULT_ITERATIONS};
use algo_reference::{
    AlgoError, BinarySearchTree, GaussianModel, Matrix, NestedSamplingConfig, Reduction, Stride,
    WorkerPool, matmul_blocked, matmul_ikj, matmul_naive, matmul_transposed, merge_sort, reduce,
    reduce_threaded,
};
use clap::{Parser, ValueEnum};
use log::{debug, error, info};

const DEFAULT_SEED: u64 = 0x1234_5678_9ABC_DEF0;

/// Pooling window used by the reduce benches.
const REDUCE_WINDOW: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
enum Bench {
    MatmulNaive,
    MatmulTransposed,
    MatmulIkj,
    MatmulBlocked,
    FftDitRadix2,
    FftDitRadix4,
    FftDifRadix2,
    FftDifRadix4,
    FftRadix4Plan,
    ReduceMax,
    ReduceMean,
    ReduceMaxThreaded,
    ReduceMeanThreaded,
    MergeSort,
    BstInsert,
    NestedSampling,
}

#[derive(Parser)]
#[command(name = "perf_harness")]
#[command(about = "Run one kernel repeatedly on deterministic input for profiling")]
struct Args {
    /// Kernel to run (see --list)
    #[arg(long, value_enum, required_unless_present = "list")]
    bench: Option<Bench>,

    /// Input size: matrix side, FFT points, elements or live objects (kernel-specific default)
    #[arg(long)]
    len: Option<usize>,

    /// Iterations (kernel-specific default)
    #[arg(long)]
    iters: Option<usize>,

    /// Seed for the input generator
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Worker threads for threaded kernels (default: available parallelism)
    #[arg(long)]
    threads: Option<usize>,

    /// Run a quick correctness check before benchmarking
    #[arg(long)]
    verify: bool,

    /// Print throughput summary after the run
    #[arg(long)]
    report: bool,

    /// Show available benches
    #[arg(long)]
    list: bool,
}

struct Config {
    bench: Bench,
    len: usize,
    iters: usize,
    seed: u64,
    pool: WorkerPool,
}

type MatmulFn = fn(&Matrix<f32>, &Matrix<f32>) -> algo_reference::Result<Matrix<f32>>;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        list_benches();
        return;
    }
    let Some(bench) = args.bench else {
        error!("missing --bench");
        process::exit(2);
    };

    let pool = match args.threads.map_or(Ok(WorkerPool::available()), WorkerPool::new) {
        Ok(pool) => pool,
        Err(err) => {
            error!("{err}");
            process::exit(2);
        }
    };
    let config = Config {
        bench,
        len: args.len.unwrap_or_else(|| bench.default_len()),
        iters: args.iters.unwrap_or_else(|| bench.default_iters()),
        seed: args.seed,
        pool,
    };

    if args.verify {
        if let Err(err) = verify_bench(bench, &config.pool) {
            error!("{} failed verification: {err}", bench.name());
            process::exit(1);
        }
        info!("{} verified", bench.name());
    }

    let start = Instant::now();
    if let Err(err) = run_bench(&config) {
        error!("{err}");
        process::exit(2);
    }
    let elapsed = start.elapsed();

    if args.report {
        print_report(&config, bench_stats(&config), elapsed);
    }
}

fn list_benches() {
    for bench in Bench::value_variants() {
        println!("{}", bench.name());
    }
}

impl Bench {
    fn default_len(self) -> usize {
        match self {
            Bench::MatmulNaive | Bench::MatmulTransposed | Bench::MatmulIkj | Bench::MatmulBlocked => 256,
            Bench::FftDitRadix2
            | Bench::FftDitRadix4
            | Bench::FftDifRadix2
            | Bench::FftDifRadix4
            | Bench::FftRadix4Plan => 4096,
            Bench::ReduceMax
            | Bench::ReduceMean
            | Bench::ReduceMaxThreaded
            | Bench::ReduceMeanThreaded => 2048,
            Bench::MergeSort => 1_000_000,
            Bench::BstInsert => 100_000,
            Bench::NestedSampling => nested_sampling::DEFAULT_OBJECTS,
        }
    }

    fn default_iters(self) -> usize {
        match self {
            Bench::MatmulNaive | Bench::MatmulTransposed | Bench::MatmulIkj | Bench::MatmulBlocked => 3,
            Bench::FftDitRadix2
            | Bench::FftDitRadix4
            | Bench::FftDifRadix2
            | Bench::FftDifRadix4
            | Bench::FftRadix4Plan => 200,
            Bench::ReduceMax
            | Bench::ReduceMean
            | Bench::ReduceMaxThreaded
            | Bench::ReduceMeanThreaded => 10,
            Bench::MergeSort => 5,
            Bench::BstInsert => 3,
            Bench::NestedSampling => 1,
        }
    }

    fn name(self) -> String {
        self.to_possible_value()
            .map(|v| v.get_name().to_owned())
            .unwrap_or_default()
    }
}

#[inline]
fn next_u64(state: &mut u64) -> u64 {
    let mut x = *state;
    x ^= x >> 12;
    x ^= x << 25;
    x ^= x >> 27;
    *state = x;
    x.wrapping_mul(0x2545_F491_4F6C_DD1D)
}

fn make_i32_input(len: usize, seed: u64) -> Vec<i32> {
    let mut state = seed;
    (0..len).map(|_| next_u64(&mut state) as u32 as i32).collect()
}

fn make_f32_matrix(n: usize, seed: u64) -> Matrix<f32> {
    let mut state = seed;
    Matrix::from_fn(n, n, |_, _| (next_u64(&mut state) & 0xFF) as f32 / 255.0)
}

fn make_f64_matrix(n: usize, seed: u64) -> Matrix<f64> {
    let mut state = seed;
    Matrix::from_fn(n, n, |_, _| (next_u64(&mut state) % 1000) as f64 - 500.0)
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

fn run_bench(config: &Config) -> Result<(), AlgoError> {
    debug!(
        "running {} len={} iters={} threads={}",
        config.bench.name(),
        config.len,
        config.iters,
        config.pool.workers()
    );
    match config.bench {
        Bench::MatmulNaive => bench_matmul(config, matmul_naive),
        Bench::MatmulTransposed => bench_matmul(config, matmul_transposed),
        Bench::MatmulIkj => bench_matmul(config, matmul_ikj),
        Bench::MatmulBlocked => bench_matmul(config, matmul_blocked),
        Bench::FftDitRadix2 => bench_fft(config, FftVariant::DitRadix2),
        Bench::FftDitRadix4 => bench_fft(config, FftVariant::DitRadix4),
        Bench::FftDifRadix2 => bench_fft(config, FftVariant::DifRadix2),
        Bench::FftDifRadix4 => bench_fft(config, FftVariant::DifRadix4),
        Bench::FftRadix4Plan => bench_fft_plan(config),
        Bench::ReduceMax => bench_reduce(config, Reduction::Max, false),
        Bench::ReduceMean => bench_reduce(config, Reduction::Mean, false),
        Bench::ReduceMaxThreaded => bench_reduce(config, Reduction::Max, true),
        Bench::ReduceMeanThreaded => bench_reduce(config, Reduction::Mean, true),
        Bench::MergeSort => {
            bench_merge_sort(config);
            Ok(())
        }
        Bench::BstInsert => {
            bench_bst_insert(config);
            Ok(())
        }
        Bench::NestedSampling => bench_nested_sampling(config),
    }
}

fn bench_matmul(config: &Config, func: MatmulFn) -> Result<(), AlgoError> {
    let a = make_f32_matrix(config.len, config.seed);
    let b = make_f32_matrix(config.len, config.seed ^ 0x9E37_79B9_7F4A_7C15);
    let mut acc = 0.0f32;
    for _ in 0..config.iters {
        let out = func(black_box(&a), black_box(&b))?;
        acc += out.as_slice().first().copied().unwrap_or_default();
    }
    black_box(acc);
    Ok(())
}

fn bench_fft(config: &Config, variant: FftVariant) -> Result<(), AlgoError> {
    variant.check_len(config.len)?;
    let input = make_signal(config.len, config.seed);
    let mut data = input.clone();
    for _ in 0..config.iters {
        data.copy_from_slice(&input);
        fft(variant, black_box(&mut data))?;
    }
    black_box(&data);
    Ok(())
}

fn bench_fft_plan(config: &Config) -> Result<(), AlgoError> {
    let mut plan = Radix4Plan::new(config.len)?;
    let input = make_signal(config.len, config.seed);
    let mut data = input.clone();
    for _ in 0..config.iters {
        data.copy_from_slice(&input);
        plan.process(black_box(&mut data))?;
    }
    black_box(&data);
    Ok(())
}

fn bench_reduce(config: &Config, reduction: Reduction, threaded: bool) -> Result<(), AlgoError> {
    let input = make_f64_matrix(config.len, config.seed);
    let mut acc = 0.0f64;
    for _ in 0..config.iters {
        let out = if threaded {
            reduce_threaded(black_box(&input), REDUCE_WINDOW, reduction, Stride::Tiled, &config.pool)?
        } else {
            reduce(black_box(&input), REDUCE_WINDOW, reduction, Stride::Tiled)?
        };
        acc += out.as_slice().first().copied().unwrap_or_default();
    }
    black_box(acc);
    Ok(())
}

fn bench_merge_sort(config: &Config) {
    let input = make_i32_input(config.len, config.seed);
    let mut data = input.clone();
    for _ in 0..config.iters {
        data.copy_from_slice(&input);
        merge_sort(black_box(&mut data));
    }
    black_box(&data);
}

fn bench_bst_insert(config: &Config) {
    let keys = make_i32_input(config.len, config.seed);
    let mut acc = 0usize;
    for _ in 0..config.iters {
        let mut tree = BinarySearchTree::with_capacity(keys.len());
        for &k in &keys {
            tree.insert(black_box(k), ());
        }
        acc ^= tree.height();
    }
    black_box(acc);
}

fn bench_nested_sampling(config: &Config) -> Result<(), AlgoError> {
    let model = GaussianModel::default();
    for i in 0..config.iters {
        let ns_config = NestedSamplingConfig {
            objects: config.len,
            seed: config.seed.wrapping_add(i as u64),
            log_every: 0,
            ..Default::default()
        };
        black_box(nested_sampling::run(&model, &ns_config)?);
    }
    Ok(())
}

struct BenchStats {
    work_items: u128,
    bytes: u128,
    unit: &'static str,
    flops: Option<f64>,
}

fn bench_stats(config: &Config) -> BenchStats {
    let n = config.len as u128;
    let iters = config.iters as u128;
    match config.bench {
        Bench::MatmulNaive | Bench::MatmulTransposed | Bench::MatmulIkj | Bench::MatmulBlocked => {
            let ops = n * n * n * iters;
            BenchStats {
                work_items: ops,
                bytes: n * n * 12 * iters,
                unit: "mul",
                flops: Some(ops as f64 * 2.0),
            }
        }
        Bench::FftDitRadix2
        | Bench::FftDitRadix4
        | Bench::FftDifRadix2
        | Bench::FftDifRadix4
        | Bench::FftRadix4Plan => {
            let log_n = f64::from(config.len.max(1).trailing_zeros());
            BenchStats {
                work_items: n * iters,
                bytes: n * 16 * iters,
                unit: "point",
                // Conventional 5 N log2 N flop count for a complex FFT.
                flops: Some(5.0 * config.len as f64 * log_n * config.iters as f64),
            }
        }
        Bench::ReduceMax
        | Bench::ReduceMean
        | Bench::ReduceMaxThreaded
        | Bench::ReduceMeanThreaded => BenchStats {
            work_items: n * n * iters,
            bytes: n * n * 8 * iters,
            unit: "elem",
            flops: None,
        },
        Bench::MergeSort => BenchStats {
            work_items: n * iters,
            bytes: n * 4 * iters,
            unit: "elem",
            flops: None,
        },
        Bench::BstInsert => BenchStats {
            work_items: n * iters,
            bytes: n * 4 * iters,
            unit: "insert",
            flops: None,
        },
        Bench::NestedSampling => BenchStats {
            work_items: DEFAULT_ITERATIONS as u128 * iters,
            bytes: 0,
            unit: "iter",
            flops: None,
        },
    }
}

fn print_report(config: &Config, stats: BenchStats, elapsed: Duration) {
    let elapsed_s = elapsed.as_secs_f64();
    let items_per_s = stats.work_items as f64 / elapsed_s;
    let bytes_per_s = stats.bytes as f64 / elapsed_s;
    let ns_per_item = (elapsed_s * 1.0e9) / stats.work_items as f64;

    let mut lines = Vec::with_capacity(5);
    lines.push(format!(
        "bench={} len={} iters={} threads={}",
        config.bench.name(),
        config.len,
        config.iters,
        config.pool.workers()
    ));
    lines.push(format!(
        "elapsed_s={:.6} ns_per_item={:.3} throughput={}",
        elapsed_s,
        ns_per_item,
        format_rate(items_per_s, stats.unit)
    ));
    lines.push(format!("work_items={} unit={}", stats.work_items, stats.unit));
    lines.push(format!(
        "bytes={} byte_throughput={}",
        stats.bytes,
        format_rate(bytes_per_s, "B")
    ));
    if let Some(flops) = stats.flops {
        lines.push(format!("gflops={}", format_rate(flops / elapsed_s, "FLOP")));
    }

    println!("{}", lines.join("\n"));
}

fn format_rate(rate: f64, unit: &str) -> String {
    let (value, prefix) = if rate >= 1.0e12 {
        (rate / 1.0e12, "T")
    } else if rate >= 1.0e9 {
        (rate / 1.0e9, "G")
    } else if rate >= 1.0e6 {
        (rate / 1.0e6, "M")
    } else if rate >= 1.0e3 {
        (rate / 1.0e3, "K")
    } else {
        (rate, "")
    };
    format!("{value:.3} {prefix}{unit}/s")
}

fn make_small_matrix(rows: usize, cols: usize) -> Matrix<f32> {
    Matrix::from_fn(rows, cols, |i, j| ((i * 3 + j * 5) % 7) as f32)
}

fn verify_matmul_variant(func: MatmulFn) -> Result<(), String> {
    // Small integer entries keep every partial sum exact, so any loop order agrees.
    let a = make_small_matrix(5, 37);
    let b = make_small_matrix(37, 3);
    let expected = matmul_naive(&a, &b).map_err(|e| e.to_string())?;
    let out = func(&a, &b).map_err(|e| e.to_string())?;
    if out != expected {
        return Err("product differs from matmul_naive".into());
    }
    Ok(())
}

fn verify_fft(transform: impl FnOnce(&mut [Complex64]) -> Result<(), AlgoError>) -> Result<(), String> {
    let input = make_signal(64, DEFAULT_SEED);
    let expected = dft(&input);
    let mut data = input.clone();
    transform(&mut data).map_err(|e| e.to_string())?;
    let scale: f64 = input.iter().map(|v| v.norm()).sum();
    let worst = expected
        .iter()
        .zip(&data)
        .map(|(e, a)| (e - a).norm())
        .fold(0.0, f64::max);
    if worst > 1e-9 * scale {
        return Err(format!("max error {worst:e} against the direct DFT"));
    }
    Ok(())
}

fn verify_reduce(reduction: Reduction, pool: Option<&WorkerPool>) -> Result<(), String> {
    let input = Matrix::from_fn(4, 4, |r, c| (r * 4 + c) as f64);
    let expected = match reduction {
        Reduction::Max => [5.0, 7.0, 13.0, 15.0],
        Reduction::Mean => [2.5, 4.5, 10.5, 12.5],
    };
    let out = match pool {
        Some(pool) => reduce_threaded(&input, 2, reduction, Stride::Tiled, pool),
        None => reduce(&input, 2, reduction, Stride::Tiled),
    }
    .map_err(|e| e.to_string())?;
    if out.as_slice() != expected {
        return Err(format!("expected {expected:?}, got {:?}", out.as_slice()));
    }
    Ok(())
}

fn verify_bench(bench: Bench, pool: &WorkerPool) -> Result<(), String> {
    match bench {
        Bench::MatmulNaive => verify_matmul_variant(matmul_naive),
        Bench::MatmulTransposed => verify_matmul_variant(matmul_transposed),
        Bench::MatmulIkj => verify_matmul_variant(matmul_ikj),
        Bench::MatmulBlocked => verify_matmul_variant(matmul_blocked),
        Bench::FftDitRadix2 => verify_fft(|data| fft(FftVariant::DitRadix2, data)),
        Bench::FftDitRadix4 => verify_fft(|data| fft(FftVariant::DitRadix4, data)),
        Bench::FftDifRadix2 => verify_fft(|data| fft(FftVariant::DifRadix2, data)),
        Bench::FftDifRadix4 => verify_fft(|data| fft(FftVariant::DifRadix4, data)),
        Bench::FftRadix4Plan => {
            let mut plan = Radix4Plan::new(64).map_err(|e| e.to_string())?;
            verify_fft(|data| plan.process(data))
        }
        Bench::ReduceMax => verify_reduce(Reduction::Max, None),
        Bench::ReduceMean => verify_reduce(Reduction::Mean, None),
        Bench::ReduceMaxThreaded => verify_reduce(Reduction::Max, Some(pool)),
        Bench::ReduceMeanThreaded => verify_reduce(Reduction::Mean, Some(pool)),
        Bench::MergeSort => {
            let mut values = [5, 3, 9, 1, 3, -2];
            merge_sort(&mut values);
            if values != [-2, 1, 3, 3, 5, 9] {
                return Err(format!("unsorted output {values:?}"));
            }
            Ok(())
        }
        Bench::BstInsert => {
            let tree: BinarySearchTree<i32, ()> = [5, 3, 9, 1, 3, -2].into_iter().map(|k| (k, ())).collect();
            let keys: Vec<i32> = tree.keys().copied().collect();
            if keys != [-2, 1, 3, 5, 9] {
                return Err(format!("in-order keys {keys:?}"));
            }
            Ok(())
        }
        Bench::NestedSampling => {
            let config = NestedSamplingConfig {
                objects: 20,
                iterations: 100,
                log_every: 0,
                ..Default::default()
            };
            let result =
                nested_sampling::run(&GaussianModel::default(), &config).map_err(|e| e.to_string())?;
            if !result.log_evidence.is_finite() {
                return Err(format!("ln Z = {}", result.log_evidence));
            }
            Ok(())
        }
    }
}
