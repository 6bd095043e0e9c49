use std::{fmt, fs, io::Write, path::Path};

use serde::{Deserialize, Serialize};

use crate::config::WorkloadConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Workload {
    Matmul,
    Softmax,
    Rmsnorm,
}

impl Workload {
    pub const ALL: [Workload; 3] =
        [Workload::Matmul, Workload::Softmax, Workload::Rmsnorm];

    pub fn name(self) -> &'static str {
        match self {
            Workload::Matmul => "matmul",
            Workload::Softmax => "softmax",
            Workload::Rmsnorm => "rmsnorm",
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    TimeS,
    Gflops,
}

impl Metric {
    pub fn name(self) -> &'static str {
        match self {
            Metric::TimeS => "time_s",
            Metric::Gflops => "gflops",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A workload object without `time_s` still parses; the metric is then
/// reported as missing instead of failing the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatmulMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_s: Option<f64>,
    #[serde(default)]
    pub gflops: f64,
}

impl MatmulMetrics {
    pub fn from_timing(
        config: &WorkloadConfig,
        time_s: f64,
    ) -> Self {
        Self {
            time_s: Some(time_s),
            gflops: gflops(config.matmul_flops(), time_s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_s: Option<f64>,
}

impl TimedMetrics {
    pub fn from_secs(time_s: f64) -> Self {
        Self {
            time_s: Some(time_s),
        }
    }
}

/// Results of one benchmark run. A `None` workload was not run or failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matmul: Option<MatmulMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub softmax: Option<TimedMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rmsnorm: Option<TimedMetrics>,
}

impl MetricReport {
    pub fn from_json_str(data: &str) -> serde_json::Result<Self> {
        let report: Self = serde_json::from_str(data)?;
        for workload in report.negative_timings() {
            log::warn!("{workload}: negative time_s in metric document");
        }
        Ok(report)
    }

    pub fn read_from(path: &Path) -> Result<Self, String> {
        let data = fs::read_to_string(path).map_err(|e| e.to_string())?;
        Self::from_json_str(&data).map_err(|e| e.to_string())
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn has(
        &self,
        workload: Workload,
    ) -> bool {
        match workload {
            Workload::Matmul => self.matmul.is_some(),
            Workload::Softmax => self.softmax.is_some(),
            Workload::Rmsnorm => self.rmsnorm.is_some(),
        }
    }

    /// Workloads reporting a `time_s` below zero.
    pub fn negative_timings(&self) -> Vec<Workload> {
        Workload::ALL
            .into_iter()
            .filter(|&workload| {
                self.metric(workload, Metric::TimeS)
                    .is_some_and(|time_s| time_s < 0.0)
            })
            .collect()
    }

    pub fn metric(
        &self,
        workload: Workload,
        metric: Metric,
    ) -> Option<f64> {
        match (workload, metric) {
            (Workload::Matmul, Metric::TimeS) => {
                self.matmul.and_then(|m| m.time_s)
            },
            (Workload::Matmul, Metric::Gflops) => {
                self.matmul.map(|m| m.gflops)
            },
            (Workload::Softmax, Metric::TimeS) => {
                self.softmax.and_then(|m| m.time_s)
            },
            (Workload::Rmsnorm, Metric::TimeS) => {
                self.rmsnorm.and_then(|m| m.time_s)
            },
            (_, Metric::Gflops) => None,
        }
    }

    /// Human-readable per-workload lines, one per workload.
    pub fn write_summary<W: Write>(
        &self,
        config: &WorkloadConfig,
        out: &mut W,
    ) -> std::io::Result<()> {
        let WorkloadConfig {
            m,
            n,
            k,
            rows,
            cols,
            iters,
            ..
        } = config;
        let matmul = self
            .matmul
            .and_then(|matmul| matmul.time_s.map(|time_s| (time_s, matmul.gflops)));
        match matmul {
            Some((time_s, gflops)) => writeln!(
                out,
                "matmul: M={m} N={n} K={k} iters={iters} time={time_s:.6}s gflops={gflops:.2}",
            )?,
            None => writeln!(out, "matmul: not reported")?,
        }
        for (workload, timed) in [
            (Workload::Softmax, self.softmax),
            (Workload::Rmsnorm, self.rmsnorm),
        ] {
            match timed.and_then(|timed| timed.time_s) {
                Some(time_s) => writeln!(
                    out,
                    "{workload}: rows={rows} cols={cols} iters={iters} time={time_s:.6}s",
                )?,
                None => writeln!(out, "{workload}: not reported")?,
            }
        }
        Ok(())
    }
}

/// Throughput in GFLOP/s; zero when the timing is not positive.
pub fn gflops(
    flops: f64,
    time_s: f64,
) -> f64 {
    if time_s > 0.0 {
        flops / time_s / 1e9
    } else {
        0.0
    }
}
