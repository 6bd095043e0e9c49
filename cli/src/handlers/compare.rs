use std::io;

use bwpp_harness::{
    MlxRunner, NativeRunner,
    orchestrator::{CompareOrchestrator, CompareSection, SectionOutcome},
};
use console::Style;

use crate::args::CompareArgs;

const MLX_INSTALL_HINT: &str =
    "Install MLX to run the Metal baseline: rebuild on macOS with `--features mlx`";

/// Prints the BW++ CPU bench next to the MLX baseline. Informational only.
pub fn handle_compare(args: CompareArgs) -> anyhow::Result<()> {
    let config = args.workload.workload_config();
    let bench_dir = &args.workload.bench_dir;

    let native = NativeRunner::in_bench_dir(bench_dir);
    let mlx = MlxRunner::new();

    let cpu = (!args.skip_bwpp).then(|| CompareSection {
        title: "BW++ CPU bench".to_string(),
        runner: &native,
        config: config.clone(),
        unavailable_hint: format!(
            "Build it with: make -C {}",
            bench_dir.display()
        ),
    });
    let gpu = (!args.skip_mlx).then(|| CompareSection {
        title: "MLX Metal baseline".to_string(),
        runner: &mlx,
        config: config.clone(),
        unavailable_hint: MLX_INSTALL_HINT.to_string(),
    });

    let stdout = io::stdout();
    let summary =
        CompareOrchestrator::new(cpu, gpu).run(&mut stdout.lock())?;

    let reported = [&summary.cpu, &summary.gpu]
        .into_iter()
        .filter(|outcome| matches!(outcome, SectionOutcome::Reported(_)))
        .count();
    let style = Style::new().dim();
    println!();
    println!("{}", style.apply_to(format!("{reported} backend(s) reported")));

    Ok(())
}
