//! The three timed workloads, expressed against [`TensorBackend`] so any
//! tensor library can serve as the baseline.
//!
//! Each loop evaluates its result every iteration and the clock brackets the
//! whole loop: `time_s` is total wall time for all iterations, not a mean.

use std::time::Instant;

use crate::{
    config::WorkloadConfig,
    error::Result,
    report::{MatmulMetrics, MetricReport, TimedMetrics},
    tensor::TensorBackend,
};

pub const RMS_NORM_EPS: f32 = 1e-5;

pub fn run_workloads<B: TensorBackend>(
    backend: &B,
    config: &WorkloadConfig,
) -> Result<MetricReport> {
    config.validate()?;

    let matmul = time_matmul(backend, config)?;

    let rows = config.rows as usize;
    let cols = config.cols as usize;
    let x = backend.uniform(&[rows, cols])?;
    backend.eval(&[&x])?;

    let softmax = time_softmax(backend, &x, config.iters)?;
    let rmsnorm = time_rms_norm(backend, &x, cols, config.iters)?;

    Ok(MetricReport {
        matmul: Some(matmul),
        softmax: Some(softmax),
        rmsnorm: Some(rmsnorm),
    })
}

pub fn time_matmul<B: TensorBackend>(
    backend: &B,
    config: &WorkloadConfig,
) -> Result<MatmulMetrics> {
    let (m, n, k) = (config.m as usize, config.n as usize, config.k as usize);
    let a = backend.uniform(&[m, k])?;
    let b = backend.uniform(&[k, n])?;
    backend.eval(&[&a, &b])?;

    let start = Instant::now();
    for _ in 0..config.iters {
        let c = backend.matmul(&a, &b)?;
        backend.eval(&[&c])?;
    }
    let time_s = start.elapsed().as_secs_f64();
    log::debug!("{}: matmul took {time_s:.6}s", backend.name());

    Ok(MatmulMetrics::from_timing(config, time_s))
}

pub fn time_softmax<B: TensorBackend>(
    backend: &B,
    x: &B::Tensor,
    iters: u32,
) -> Result<TimedMetrics> {
    let start = Instant::now();
    for _ in 0..iters {
        let y = backend.softmax_last_axis(x)?;
        backend.eval(&[&y])?;
    }
    let time_s = start.elapsed().as_secs_f64();
    log::debug!("{}: softmax took {time_s:.6}s", backend.name());
    Ok(TimedMetrics::from_secs(time_s))
}

/// `x * rsqrt(mean(x * x, -1, keepdims) + eps) * gamma` with unit `gamma`.
pub fn time_rms_norm<B: TensorBackend>(
    backend: &B,
    x: &B::Tensor,
    cols: usize,
    iters: u32,
) -> Result<TimedMetrics> {
    let gamma = backend.ones(&[cols])?;
    backend.eval(&[&gamma])?;

    let start = Instant::now();
    for _ in 0..iters {
        let y = rms_norm(backend, x, &gamma)?;
        backend.eval(&[&y])?;
    }
    let time_s = start.elapsed().as_secs_f64();
    log::debug!("{}: rmsnorm took {time_s:.6}s", backend.name());
    Ok(TimedMetrics::from_secs(time_s))
}

pub fn rms_norm<B: TensorBackend>(
    backend: &B,
    x: &B::Tensor,
    gamma: &B::Tensor,
) -> Result<B::Tensor> {
    let squared = backend.multiply(x, x)?;
    let mean = backend.mean_last_axis_keepdims(&squared)?;
    let inv = backend.rsqrt(&backend.add_scalar(&mean, RMS_NORM_EPS)?)?;
    let scaled = backend.multiply(x, &inv)?;
    backend.multiply(&scaled, gamma)
}
