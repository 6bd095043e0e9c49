use std::{
    io::{self, Write},
    path::PathBuf,
};

use crate::{
    baseline::BaselineStore,
    build_step::MakeBuild,
    comparator::{ComparisonResult, compare_reports},
    config::{Tolerance, WorkloadConfig},
    error::HarnessError,
    runner::BackendRunner,
};

#[derive(Debug, Clone)]
pub struct RegressionConfig {
    pub workload: WorkloadConfig,
    pub baseline: PathBuf,
    pub tolerance: Tolerance,
    /// Replace the baseline with the current run instead of comparing.
    pub update: bool,
}

#[derive(Debug)]
pub enum RegressionOutcome {
    BaselineUpdated(PathBuf),
    Passed(ComparisonResult),
    Regressed(ComparisonResult),
    /// No verdict could be reached: bench unavailable, report unreadable,
    /// or baseline missing or corrupt.
    Aborted(HarnessError),
}

impl RegressionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RegressionOutcome::BaselineUpdated(_) | RegressionOutcome::Passed(_)
        )
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// One regression-guard invocation: build, bench once, then either update
/// the baseline or compare against it.
pub struct RegressionOrchestrator<'a> {
    runner: &'a dyn BackendRunner,
    build: Option<MakeBuild>,
    unavailable_hint: Option<String>,
    config: RegressionConfig,
}

impl<'a> RegressionOrchestrator<'a> {
    pub fn new(
        runner: &'a dyn BackendRunner,
        config: RegressionConfig,
    ) -> Self {
        Self {
            runner,
            build: None,
            unavailable_hint: None,
            config,
        }
    }

    pub fn with_build(
        mut self,
        build: MakeBuild,
    ) -> Self {
        self.build = Some(build);
        self
    }

    /// Printed after the error when the bench executable is unavailable.
    pub fn with_unavailable_hint(
        mut self,
        hint: impl Into<String>,
    ) -> Self {
        self.unavailable_hint = Some(hint.into());
        self
    }

    pub fn run<W: Write>(
        &self,
        out: &mut W,
    ) -> io::Result<RegressionOutcome> {
        if let Some(build) = &self.build {
            build.run();
        }

        let current = match self.runner.run(&self.config.workload) {
            Ok(report) => report,
            Err(error) => {
                writeln!(out, "{error}")?;
                if let Some(hint) = self
                    .unavailable_hint
                    .as_ref()
                    .filter(|_| error.is_unavailable())
                {
                    writeln!(out, "{hint}")?;
                }
                return Ok(RegressionOutcome::Aborted(error));
            },
        };

        let store = BaselineStore::new(&self.config.baseline);
        if self.config.update {
            if let Err(error) = store.save(&current) {
                writeln!(out, "failed to write baseline: {error}")?;
                return Ok(RegressionOutcome::Aborted(error));
            }
            writeln!(out, "baseline updated: {}", store.path().display())?;
            return Ok(RegressionOutcome::BaselineUpdated(
                store.path().to_path_buf(),
            ));
        }

        let baseline = match store.load() {
            Ok(baseline) => baseline,
            Err(error @ HarnessError::BaselineMissing(_)) => {
                writeln!(out, "{error}")?;
                writeln!(out, "run with --update to create it")?;
                return Ok(RegressionOutcome::Aborted(error));
            },
            Err(error) => {
                writeln!(out, "{error}")?;
                return Ok(RegressionOutcome::Aborted(error));
            },
        };

        let result = compare_reports(&baseline, &current, self.config.tolerance);
        for comparison in &result.comparisons {
            writeln!(out, "{comparison}")?;
        }

        if result.passed() {
            writeln!(out, "regression check OK")?;
            Ok(RegressionOutcome::Passed(result))
        } else {
            writeln!(
                out,
                "regression detected: {} metric(s) exceeded tolerance",
                result.failures()
            )?;
            Ok(RegressionOutcome::Regressed(result))
        }
    }
}
