use std::io;

use bwpp_harness::{
    NativeRunner,
    build_step::MakeBuild,
    orchestrator::{RegressionConfig, RegressionOrchestrator, RegressionOutcome},
};

use crate::args::RegressArgs;

pub fn handle_regress(args: RegressArgs) -> anyhow::Result<RegressionOutcome> {
    let bench_dir = &args.workload.bench_dir;
    let runner = NativeRunner::in_bench_dir(bench_dir);
    let config = RegressionConfig {
        workload: args.workload.workload_config(),
        baseline: args.baseline.clone(),
        tolerance: args.tol,
        update: args.update,
    };

    let mut orchestrator = RegressionOrchestrator::new(&runner, config)
        .with_unavailable_hint(format!(
            "Build it with: make -C {}",
            bench_dir.display()
        ));
    if !args.no_build {
        orchestrator = orchestrator.with_build(MakeBuild::new(bench_dir));
    }

    let stdout = io::stdout();
    let outcome = orchestrator.run(&mut stdout.lock())?;
    Ok(outcome)
}
