use std::{
    io::{self, Write},
    process::ExitCode,
};

use clap::{CommandFactory, Parser, Subcommand};
use cli::{
    args::{CompareArgs, RegressArgs},
    handlers::{handle_compare, handle_regress},
};

#[derive(Parser)]
#[command(about = "BW++ benchmark comparison and regression guard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the BW++ CPU bench and the MLX baseline side by side
    Compare(CompareArgs),
    /// Compare the BW++ CPU bench against the stored baseline
    Regress(RegressArgs),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    )
    .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Compare(args)) => {
            if let Err(error) = handle_compare(args) {
                log::error!("compare: {error:#}");
            }
            ExitCode::SUCCESS
        },
        Some(Commands::Regress(args)) => match handle_regress(args) {
            Ok(outcome) => ExitCode::from(outcome.exit_code()),
            Err(error) => {
                eprintln!("❌ {error:#}");
                ExitCode::FAILURE
            },
        },
        None => print_help(&mut io::stdout()),
    }
}

fn print_help<W: Write>(out: &mut W) -> ExitCode {
    match Cli::command().write_help(out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("failed to print help: {error}");
            ExitCode::FAILURE
        },
    }
}
