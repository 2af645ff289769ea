//! Performance measurement utilities for benchmarks.

use super::benchmark_types::TimingResults;
use log::{info, warn};
use std::time::Instant;

const SEPARATOR_WIDTH: usize = 80;

/// Prints `title` framed by two separator lines.
pub fn print_section_header(title: &str) {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    println!("\n{}", separator);
    println!("{}", title);
    println!("{}", separator);
}

/// Times `benchmark_fn` in `repeat` measurements of `number` calls each,
/// after `warmup_runs` untimed calls. The first error aborts the run.
pub fn repeat_timing<F, E>(
    name: &str,
    number: u32,
    repeat: u32,
    warmup_runs: u32,
    mut benchmark_fn: F,
) -> Result<TimingResults, E>
where
    F: FnMut() -> Result<(), E>,
{
    info!(
        "Benchmarking {} ({} x {} executions)...",
        name, repeat, number
    );

    for _ in 0..warmup_runs {
        benchmark_fn()?;
    }

    let mut measurements_s = Vec::with_capacity(repeat as usize);
    for i in 0..repeat {
        let start = Instant::now();
        for _ in 0..number {
            benchmark_fn()?;
        }
        let duration = start.elapsed();
        measurements_s.push(duration.as_secs_f64());
        info!(
            "  Repeat {}/{}: {:.3} ms",
            i + 1,
            repeat,
            duration.as_secs_f64() * 1000.0
        );
    }

    Ok(TimingResults::new(name.to_string(), number, measurements_s))
}

/// Prints per-model results and, for more than one model, a speed ranking.
pub fn print_performance_analysis(results: &[TimingResults]) {
    if results.is_empty() {
        return;
    }

    print_section_header("Detailed Results");

    for result in results {
        println!("\n📊 {}", result.name);
        println!("   {}", result.summary_line());
        println!("   Best: {:.4} ms per loop", result.best_ms());
        println!(
            "   Runs: {} x {} loops",
            result.measurements_s.len(),
            result.number
        );
    }

    if results.len() < 2 {
        return;
    }

    print_section_header("Performance Analysis");

    println!("\n🚀 Speed Rankings (fastest to slowest):");
    let mut sorted_results = results.to_vec();
    sorted_results.sort_by(|a, b| a.mean_ms().total_cmp(&b.mean_ms()));

    let fastest = sorted_results[0].mean_ms();
    for (i, result) in sorted_results.iter().enumerate() {
        let rank_emoji = match i {
            0 => "🥇",
            1 => "🥈",
            2 => "🥉",
            _ => "  ",
        };
        let ratio = if fastest > 0.0 {
            result.mean_ms() / fastest
        } else {
            1.0
        };
        println!(
            "   {} {}: {:.4} ms ({:.2}x)",
            rank_emoji,
            result.name,
            result.mean_ms(),
            ratio
        );
    }
}

/// Verifies that two output vectors agree within `epsilon`.
pub fn verify_outputs_match(reference_output: &[f32], model_output: &[f32], epsilon: f32) -> bool {
    if reference_output.len() != model_output.len() {
        warn!(
            "Output length mismatch: reference={}, model={}",
            reference_output.len(),
            model_output.len()
        );
        return false;
    }
    for (i, (reference, model)) in reference_output.iter().zip(model_output).enumerate() {
        let diff = (reference - model).abs();
        if diff > epsilon || diff.is_nan() {
            warn!(
                "Output mismatch at {}: reference={}, model={}, diff={}",
                i, reference, model, diff
            );
            return false;
        }
    }
    true
}
