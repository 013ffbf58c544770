use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use crate::TestRunner;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a solution against a doctest-style test specification
    Verify {
        /// Path to the candidate solution
        #[arg(long)]
        solution: PathBuf,
        /// Path to the test specification
        #[arg(long)]
        tests: PathBuf,
        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },
}

pub fn run() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Verify {
            solution,
            tests,
            pretty,
        } => verify(&solution, &tests, pretty),
    }
}

fn verify(solution: &Path, tests: &Path, pretty: bool) -> Result<()> {
    let solution_text = fs::read_to_string(solution)
        .with_context(|| format!("failed to read solution {}", solution.display()))?;
    let tests_text = fs::read_to_string(tests)
        .with_context(|| format!("failed to read tests {}", tests.display()))?;

    let mut runner = TestRunner::new(solution_text, tests_text);
    runner.run()?;

    let report = runner.to_report();
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}
