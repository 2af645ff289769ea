//! Main benchmark CLI executable.

use clap::Parser;
use densebench::Activation;
use densebench::benchmarks::{
    BenchmarkConfig, BenchmarkResult, BenchmarkRunner, ConfigLoader, ConfigOverrides,
};
use log::{error, info};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about = "Dense network inference latency sweep", long_about = None)]
struct Cli {
    /// JSON configuration file (defaults to configs/benchmark.json when present)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Model to run instead of the configured selection
    #[arg(long, conflicts_with = "all")]
    model: Option<String>,

    /// Run every configured model
    #[arg(long)]
    all: bool,

    /// List configured models and exit
    #[arg(long)]
    list: bool,

    /// Inference calls per measurement
    #[arg(long)]
    number: Option<u32>,

    /// Number of measurements
    #[arg(long)]
    repeat: Option<u32>,

    /// Untimed calls before measuring
    #[arg(long)]
    warmup: Option<u32>,

    /// Seed for weights and input
    #[arg(long)]
    seed: Option<u64>,

    /// Width of the random input vector
    #[arg(long)]
    input_size: Option<usize>,

    /// Activation of the hidden layers (relu, sigmoid, tanh, softmax, linear)
    #[arg(long, value_parser = parse_activation)]
    hidden_activation: Option<Activation>,

    /// Activation of the last layer
    #[arg(long, value_parser = parse_activation)]
    output_activation: Option<Activation>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model: self.model.clone(),
            number: self.number,
            repeat: self.repeat,
            warmup_runs: self.warmup,
            seed: self.seed,
            input_size: self.input_size,
            hidden_activation: self.hidden_activation,
            output_activation: self.output_activation,
        }
    }
}

fn parse_activation(name: &str) -> Result<Activation, String> {
    Activation::get_by_name(name).ok_or_else(|| format!("unknown activation '{}'", name))
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run_benchmarks(&cli) {
        error!("Benchmark execution failed: {}", e);
        std::process::exit(1);
    }
}

fn run_benchmarks(cli: &Cli) -> BenchmarkResult<()> {
    let config: BenchmarkConfig =
        ConfigLoader::load(cli.config.as_deref())?.with_overrides(&cli.overrides());
    let runner = BenchmarkRunner::new(config)?;

    if cli.list {
        runner.print_models();
        return Ok(());
    }

    if cli.all {
        let results = runner.run_all()?;
        info!("Timed {} models", results.len());
    } else {
        runner.run_selected()?;
    }

    Ok(())
}
