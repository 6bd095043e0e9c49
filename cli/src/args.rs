use std::path::PathBuf;

use bwpp_harness::{
    Tolerance, WorkloadConfig,
    config::{
        DEFAULT_BASELINE_PATH, DEFAULT_BENCH_DIR, DEFAULT_DIM, DEFAULT_ITERS,
    },
};
use clap::Args;

fn positive() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(1..)
}

fn parse_tolerance(value: &str) -> Result<Tolerance, String> {
    value.parse::<Tolerance>().map_err(|e| e.to_string())
}

#[derive(Args, Debug, Clone)]
pub struct WorkloadArgs {
    /// Iterations per workload
    #[arg(long, default_value_t = DEFAULT_ITERS, value_parser = positive())]
    pub iters: u32,
    /// Matmul rows of A
    #[arg(long, default_value_t = DEFAULT_DIM, value_parser = positive())]
    pub m: u32,
    /// Matmul columns of B
    #[arg(long, default_value_t = DEFAULT_DIM, value_parser = positive())]
    pub n: u32,
    /// Matmul shared dimension
    #[arg(long, default_value_t = DEFAULT_DIM, value_parser = positive())]
    pub k: u32,
    /// Softmax / RMSNorm rows
    #[arg(long, default_value_t = DEFAULT_DIM, value_parser = positive())]
    pub rows: u32,
    /// Softmax / RMSNorm columns
    #[arg(long, default_value_t = DEFAULT_DIM, value_parser = positive())]
    pub cols: u32,
    /// Backend selector passed through to bwpp_bench as --metal
    #[arg(long)]
    pub metal: Option<String>,
    /// Directory holding bwpp_bench and its Makefile
    #[arg(long, default_value = DEFAULT_BENCH_DIR)]
    pub bench_dir: PathBuf,
}

impl WorkloadArgs {
    pub fn workload_config(&self) -> WorkloadConfig {
        WorkloadConfig {
            m: self.m,
            n: self.n,
            k: self.k,
            rows: self.rows,
            cols: self.cols,
            iters: self.iters,
            backend_selector: self.metal.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub workload: WorkloadArgs,
    /// Do not run the BW++ CPU bench
    #[arg(long)]
    pub skip_bwpp: bool,
    /// Do not run the MLX baseline
    #[arg(long)]
    pub skip_mlx: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RegressArgs {
    #[command(flatten)]
    pub workload: WorkloadArgs,
    /// Baseline snapshot to compare against or update
    #[arg(long, default_value = DEFAULT_BASELINE_PATH)]
    pub baseline: PathBuf,
    /// Replace the baseline with this run
    #[arg(long)]
    pub update: bool,
    /// Max slowdown ratio (e.g. 0.2 = 20%)
    #[arg(long, default_value = "0.20", value_parser = parse_tolerance)]
    pub tol: Tolerance,
    /// Skip `make -C <bench dir>` before running
    #[arg(long)]
    pub no_build: bool,
}
