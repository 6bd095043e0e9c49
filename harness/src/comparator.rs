use std::fmt;

use crate::{
    config::Tolerance,
    report::{Metric, MetricReport, Workload},
};

/// Metrics gated by the regression check.
pub const TRACKED_METRICS: [(Workload, Metric); 3] = [
    (Workload::Matmul, Metric::TimeS),
    (Workload::Softmax, Metric::TimeS),
    (Workload::Rmsnorm, Metric::TimeS),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Slow,
}

impl fmt::Display for Verdict {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Verdict::Ok => f.write_str("OK"),
            Verdict::Slow => f.write_str("SLOW"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Compared {
        baseline: f64,
        current: f64,
        ratio: f64,
        verdict: Verdict,
    },
    /// Absent from the baseline, the current report, or both.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricComparison {
    pub workload: Workload,
    pub metric: Metric,
    pub outcome: Outcome,
}

impl MetricComparison {
    pub fn is_failure(&self) -> bool {
        !matches!(
            self.outcome,
            Outcome::Compared {
                verdict: Verdict::Ok,
                ..
            }
        )
    }
}

impl fmt::Display for MetricComparison {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.outcome {
            Outcome::Compared {
                baseline,
                current,
                ratio,
                verdict,
            } => write!(
                f,
                "{}.{}: base={baseline:.6}s cur={current:.6}s ratio={ratio:.2} [{verdict}]",
                self.workload, self.metric
            ),
            Outcome::Missing => {
                write!(f, "missing metric: {}.{}", self.workload, self.metric)
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub comparisons: Vec<MetricComparison>,
}

impl ComparisonResult {
    pub fn failures(&self) -> usize {
        self.comparisons.iter().filter(|c| c.is_failure()).count()
    }

    pub fn passed(&self) -> bool {
        self.failures() == 0
    }
}

/// Classifies a single ratio. Non-positive baselines never fail and report
/// a ratio of zero.
pub fn classify(
    baseline: f64,
    current: f64,
    tolerance: Tolerance,
) -> (Verdict, f64) {
    if baseline <= 0.0 {
        return (Verdict::Ok, 0.0);
    }
    let ratio = current / baseline;
    if ratio <= tolerance.max_ratio() {
        (Verdict::Ok, ratio)
    } else {
        (Verdict::Slow, ratio)
    }
}

pub fn compare_metric(
    baseline: &MetricReport,
    current: &MetricReport,
    workload: Workload,
    metric: Metric,
    tolerance: Tolerance,
) -> MetricComparison {
    let outcome = match (
        baseline.metric(workload, metric),
        current.metric(workload, metric),
    ) {
        (Some(base), Some(cur)) => {
            let (verdict, ratio) = classify(base, cur, tolerance);
            Outcome::Compared {
                baseline: base,
                current: cur,
                ratio,
                verdict,
            }
        },
        _ => Outcome::Missing,
    };
    MetricComparison {
        workload,
        metric,
        outcome,
    }
}

pub fn compare_reports(
    baseline: &MetricReport,
    current: &MetricReport,
    tolerance: Tolerance,
) -> ComparisonResult {
    let comparisons = TRACKED_METRICS
        .iter()
        .map(|&(workload, metric)| {
            compare_metric(baseline, current, workload, metric, tolerance)
        })
        .collect();
    ComparisonResult {
        comparisons,
    }
}
