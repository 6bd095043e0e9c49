use std::{ffi::OsString, fmt, path::Path, str::FromStr};

use crate::error::{HarnessError, Result};

pub const DEFAULT_DIM: u32 = 256;
pub const DEFAULT_ITERS: u32 = 10;
pub const DEFAULT_TOLERANCE: f64 = 0.20;
pub const DEFAULT_BENCH_DIR: &str = "bench";
pub const DEFAULT_BASELINE_PATH: &str = "bench/baseline_cpu.json";

/// Dimensions and iteration counts shared by all three workloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadConfig {
    pub m: u32,
    pub n: u32,
    pub k: u32,
    pub rows: u32,
    pub cols: u32,
    pub iters: u32,
    /// Opaque backend selector, forwarded to the native bench as `--metal`.
    pub backend_selector: Option<String>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            m: DEFAULT_DIM,
            n: DEFAULT_DIM,
            k: DEFAULT_DIM,
            rows: DEFAULT_DIM,
            cols: DEFAULT_DIM,
            iters: DEFAULT_ITERS,
            backend_selector: None,
        }
    }
}

impl WorkloadConfig {
    pub fn new(
        m: u32,
        n: u32,
        k: u32,
        rows: u32,
        cols: u32,
        iters: u32,
        backend_selector: Option<String>,
    ) -> Result<Self> {
        let config = Self {
            m,
            n,
            k,
            rows,
            cols,
            iters,
            backend_selector,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("m", self.m),
            ("n", self.n),
            ("k", self.k),
            ("rows", self.rows),
            ("cols", self.cols),
            ("iters", self.iters),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(HarnessError::InvalidConfig(format!(
                    "{name} must be a positive integer"
                )));
            }
        }
        Ok(())
    }

    /// Command line for the native bench executable, reporting into `json_path`.
    pub fn native_args(
        &self,
        json_path: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> =
            vec!["--json".into(), json_path.as_os_str().to_owned()];
        let numeric = [
            ("--iters", self.iters),
            ("--m", self.m),
            ("--n", self.n),
            ("--k", self.k),
            ("--rows", self.rows),
            ("--cols", self.cols),
        ];
        for (flag, value) in numeric {
            args.push(flag.into());
            args.push(value.to_string().into());
        }
        if let Some(selector) = &self.backend_selector {
            args.push("--metal".into());
            args.push(selector.into());
        }
        args
    }

    pub fn matmul_flops(&self) -> f64 {
        2.0 * self.m as f64
            * self.n as f64
            * self.k as f64
            * self.iters as f64
    }
}

/// Maximum accepted slowdown as a fraction, `0.2` allows 20%.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Tolerance(f64);

impl Tolerance {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(HarnessError::InvalidConfig(format!(
                "tolerance must be a finite non-negative number, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn max_ratio(self) -> f64 {
        1.0 + self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(DEFAULT_TOLERANCE)
    }
}

impl FromStr for Tolerance {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().parse::<f64>().map_err(|e| {
            HarnessError::InvalidConfig(format!("tolerance {s:?}: {e}"))
        })?;
        Tolerance::new(value)
    }
}

impl fmt::Display for Tolerance {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
