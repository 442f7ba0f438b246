use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use botsim_analyzer::{AnalysisOutcome, Analyzer, AnalyzerConfig};

#[derive(Parser, Debug)]
#[command(
    name = "botsim-analyzer",
    version,
    about = "Analyze simulation logs and generate an HTML report."
)]
struct Cli {
    /// Path to the simulation .jsonl log file.
    log_file: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    if !cli.log_file.exists() {
        println!("Error: Log file not found at {}", cli.log_file.display());
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("resolve working directory")?;
    let config = AnalyzerConfig::load(&cwd)?;
    let analyzer = Analyzer::new(config);

    if let AnalysisOutcome::Report(report) = analyzer.analyze_log(&cli.log_file, &cwd)? {
        let name = report
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| report.output.display().to_string());
        println!("Analysis complete! Report saved to {name}");
    }
    Ok(())
}

/// Logs go to stderr; stdout is reserved for the user-facing messages.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("botsim_analyzer=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
