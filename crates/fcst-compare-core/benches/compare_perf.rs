//! Timing of the individual forecasters and the full comparison.
//!
//! Run with: cargo bench --bench compare_perf

use std::time::{Duration, Instant};

use fcst_compare_core::{ComparisonConfig, Series};

fn generate_series(n: usize, period: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let trend = 0.05 * i as f64;
            let seasonal = 8.0 * (2.0 * std::f64::consts::PI * i as f64 / period as f64).sin();
            100.0 + trend + seasonal + (i % 5) as f64 * 0.2
        })
        .collect()
}

fn benchmark_fn<F, R>(name: &str, iterations: usize, mut f: F) -> Duration
where
    F: FnMut() -> R,
{
    let _ = f();

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = std::hint::black_box(f());
    }
    let elapsed = start.elapsed();
    println!(
        "{}: total={:?}, per_iter={:?}, iters={}",
        name,
        elapsed,
        elapsed / iterations as u32,
        iterations
    );
    elapsed
}

fn main() {
    println!("=== Forecast Comparison Benchmark ===\n");

    let lengths = [48, 120, 500, 2000];

    println!("--- 1. Single models ---\n");
    for &n in &lengths {
        let values = generate_series(n, 12);
        let iters = if n <= 500 { 50 } else { 5 };

        benchmark_fn(&format!("holt_winters(n={})", n), iters, || {
            fcst_compare_core::forecast_holt_winters(&values, 0.3, 0.1, 12, 12)
        });
        benchmark_fn(&format!("arima(1,1,1)(n={})", n), iters, || {
            fcst_compare_core::forecast_arima(&values, 1, 1, 1, 12)
        });
        benchmark_fn(&format!("moving_average(n={})", n), iters, || {
            fcst_compare_core::forecast_moving_average(&values, 3, 12)
        });
        println!();
    }

    println!("--- 2. Full comparison ---\n");
    for &n in &lengths {
        let series = match Series::new(generate_series(n, 12)) {
            Ok(series) => series,
            Err(e) => {
                eprintln!("skipping n={}: {}", n, e);
                continue;
            }
        };
        let iters = if n <= 500 { 20 } else { 3 };
        let Ok(config) = ComparisonConfig::new(12) else {
            continue;
        };

        let parallel = benchmark_fn(&format!("compare parallel(n={})", n), iters, || {
            fcst_compare_core::compare(&series, &config.with_parallel(true))
        });
        let sequential = benchmark_fn(&format!("compare sequential(n={})", n), iters, || {
            fcst_compare_core::compare(&series, &config.with_parallel(false))
        });
        println!(
            "  speedup: {:.2}x\n",
            sequential.as_secs_f64() / parallel.as_secs_f64().max(f64::EPSILON)
        );
    }
}
