use std::io::{self, Write};

use comfy_table::{
    CellAlignment, ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS,
    presets::UTF8_FULL,
};

use crate::{
    config::WorkloadConfig,
    error::HarnessError,
    report::{Metric, MetricReport, Workload},
    runner::BackendRunner,
};

/// One backend's part of a side-by-side run.
pub struct CompareSection<'a> {
    pub title: String,
    pub runner: &'a dyn BackendRunner,
    pub config: WorkloadConfig,
    /// Printed after the error when the backend is unavailable.
    pub unavailable_hint: String,
}

#[derive(Debug)]
pub enum SectionOutcome {
    Skipped,
    Unavailable(HarnessError),
    Failed(HarnessError),
    Reported(MetricReport),
}

impl SectionOutcome {
    pub fn report(&self) -> Option<&MetricReport> {
        match self {
            SectionOutcome::Reported(report) => Some(report),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct CompareSummary {
    pub cpu: SectionOutcome,
    pub gpu: SectionOutcome,
}

/// Runs the CPU bench and the GPU baseline one after the other and prints
/// both reports. Nothing is gated: a missing backend only empties its
/// section.
pub struct CompareOrchestrator<'a> {
    cpu: Option<CompareSection<'a>>,
    gpu: Option<CompareSection<'a>>,
}

impl<'a> CompareOrchestrator<'a> {
    pub fn new(
        cpu: Option<CompareSection<'a>>,
        gpu: Option<CompareSection<'a>>,
    ) -> Self {
        Self {
            cpu,
            gpu,
        }
    }

    pub fn run<W: Write>(
        &self,
        out: &mut W,
    ) -> io::Result<CompareSummary> {
        let cpu = run_section(self.cpu.as_ref(), out)?;
        let gpu = run_section(self.gpu.as_ref(), out)?;

        if let (Some(cpu_section), Some(gpu_section)) = (&self.cpu, &self.gpu) {
            if let (Some(cpu_report), Some(gpu_report)) =
                (cpu.report(), gpu.report())
            {
                let table = side_by_side(
                    (cpu_section.runner.name(), cpu_report),
                    (gpu_section.runner.name(), gpu_report),
                );
                writeln!(out)?;
                writeln!(out, "{table}")?;
            }
        }

        Ok(CompareSummary {
            cpu,
            gpu,
        })
    }
}

fn run_section<W: Write>(
    section: Option<&CompareSection<'_>>,
    out: &mut W,
) -> io::Result<SectionOutcome> {
    let Some(section) = section else {
        return Ok(SectionOutcome::Skipped);
    };
    writeln!(out, "== {} ==", section.title)?;
    let outcome = match section.runner.run(&section.config) {
        Ok(report) => {
            report.write_summary(&section.config, out)?;
            SectionOutcome::Reported(report)
        },
        Err(error) if error.is_unavailable() => {
            writeln!(out, "{error}")?;
            if !section.unavailable_hint.is_empty() {
                writeln!(out, "{}", section.unavailable_hint)?;
            }
            SectionOutcome::Unavailable(error)
        },
        Err(error) => {
            writeln!(out, "{error}")?;
            SectionOutcome::Failed(error)
        },
    };
    Ok(outcome)
}

fn format_metric(
    report: &MetricReport,
    workload: Workload,
    metric: Metric,
) -> String {
    match (report.metric(workload, metric), metric) {
        (Some(value), Metric::TimeS) => format!("{value:.6}"),
        (Some(value), Metric::Gflops) => format!("{value:.2}"),
        (None, _) => "-".to_string(),
    }
}

fn side_by_side(
    (left_name, left): (&str, &MetricReport),
    (right_name, right): (&str, &MetricReport),
) -> Table {
    let rows = [
        (Workload::Matmul, Metric::TimeS),
        (Workload::Matmul, Metric::Gflops),
        (Workload::Softmax, Metric::TimeS),
        (Workload::Rmsnorm, Metric::TimeS),
    ];

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Metric", left_name, right_name]);
    for (workload, metric) in rows {
        table.add_row(vec![
            format!("{workload}.{metric}"),
            format_metric(left, workload, metric),
            format_metric(right, workload, metric),
        ]);
    }
    for index in 1..=2 {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}
