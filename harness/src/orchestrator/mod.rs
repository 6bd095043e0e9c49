mod compare;
mod regression;

pub use compare::{
    CompareOrchestrator, CompareSection, CompareSummary, SectionOutcome,
};
pub use regression::{
    RegressionConfig, RegressionOrchestrator, RegressionOutcome,
};
