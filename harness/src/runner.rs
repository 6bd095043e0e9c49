use std::{
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    config::WorkloadConfig,
    error::{HarnessError, Result},
    report::MetricReport,
    tensor::TensorBackend,
    workloads::run_workloads,
};

pub const NATIVE_BACKEND_NAME: &str = "bwpp_bench";
pub const MLX_BACKEND_NAME: &str = "MLX";

/// Produces one [`MetricReport`] per invocation, blocking until done.
pub trait BackendRunner {
    fn name(&self) -> &str;

    fn run(
        &self,
        config: &WorkloadConfig,
    ) -> Result<MetricReport>;
}

/// Drives the externally built `bwpp_bench` executable.
///
/// The executable reports through a JSON document written to a temporary
/// file; its exit status and stdout are not part of the contract.
pub struct NativeRunner {
    executable: PathBuf,
}

impl NativeRunner {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// `<bench_dir>/bwpp_bench`
    pub fn in_bench_dir(bench_dir: &Path) -> Self {
        Self::new(bench_dir.join(NATIVE_BACKEND_NAME))
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn invoke(
        &self,
        config: &WorkloadConfig,
        json_path: &Path,
    ) {
        let args = config.native_args(json_path);
        log::debug!("running {:?} {:?}", self.executable, args);
        match Command::new(&self.executable).args(&args).status() {
            Ok(status) if status.success() => {},
            Ok(status) => {
                log::warn!("{} exited with {status}", self.executable.display())
            },
            Err(error) => log::warn!(
                "failed to launch {}: {error}",
                self.executable.display()
            ),
        }
    }
}

impl BackendRunner for NativeRunner {
    fn name(&self) -> &str {
        NATIVE_BACKEND_NAME
    }

    fn run(
        &self,
        config: &WorkloadConfig,
    ) -> Result<MetricReport> {
        config.validate()?;
        if !self.executable.exists() {
            return Err(HarnessError::BackendUnavailable {
                backend: NATIVE_BACKEND_NAME.to_string(),
                reason: format!("{} not found", self.executable.display()),
            });
        }

        let report_file = tempfile::Builder::new()
            .prefix("bwpp_bench_")
            .suffix(".json")
            .tempfile()?;
        let json_path = report_file.path().to_path_buf();

        self.invoke(config, &json_path);
        let report = MetricReport::read_from(&json_path);

        if let Err(error) = report_file.close() {
            log::debug!("could not remove {}: {error}", json_path.display());
        }

        report.map_err(|reason| HarnessError::ReportUnreadable {
            path: json_path,
            reason,
        })
    }
}

/// Runs the workloads in-process on an already loaded tensor library.
pub struct TensorRunner<B> {
    backend: B,
}

impl<B: TensorBackend> TensorRunner<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
        }
    }
}

impl<B: TensorBackend> BackendRunner for TensorRunner<B> {
    fn name(&self) -> &str {
        self.backend.name()
    }

    fn run(
        &self,
        config: &WorkloadConfig,
    ) -> Result<MetricReport> {
        run_workloads(&self.backend, config)
    }
}

/// The MLX baseline. MLX is probed on every run; when it cannot be loaded
/// the run fails with [`HarnessError::BackendUnavailable`].
#[derive(Default)]
pub struct MlxRunner;

impl MlxRunner {
    pub fn new() -> Self {
        Self
    }
}

impl BackendRunner for MlxRunner {
    fn name(&self) -> &str {
        MLX_BACKEND_NAME
    }

    #[cfg(all(feature = "mlx", target_os = "macos"))]
    fn run(
        &self,
        config: &WorkloadConfig,
    ) -> Result<MetricReport> {
        let backend = crate::tensor::MlxBackend::probe(
            config.backend_selector.as_deref(),
        )?;
        log::info!("MLX baseline running on {}", backend.device_label());
        TensorRunner::new(backend).run(config)
    }

    #[cfg(not(all(feature = "mlx", target_os = "macos")))]
    fn run(
        &self,
        _config: &WorkloadConfig,
    ) -> Result<MetricReport> {
        let reason = if cfg!(target_os = "macos") {
            "built without the `mlx` feature"
        } else {
            "MLX needs macOS with Metal"
        };
        Err(HarnessError::BackendUnavailable {
            backend: MLX_BACKEND_NAME.to_string(),
            reason: reason.to_string(),
        })
    }
}
