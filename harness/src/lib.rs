//! Benchmark comparison and regression guard for the BW++ compute engine.

#[cfg(test)]
#[macro_use]
extern crate is_close;

pub mod baseline;
pub mod build_step;
pub mod comparator;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod runner;
pub mod tensor;
pub mod workloads;

pub use baseline::BaselineStore;
pub use config::{Tolerance, WorkloadConfig};
pub use error::HarnessError;
pub use report::{Metric, MetricReport, Workload};
pub use runner::{BackendRunner, MlxRunner, NativeRunner, TensorRunner};
