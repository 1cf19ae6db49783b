use std::path::PathBuf;

use clap::Parser;

use jelly_bench::config::{BenchmarkConfig, ResolvedOutputs};
use jelly_bench::logging::init_logging;
use jelly_bench::tournament::TournamentRunner;

/// Head-to-head benchmarking harness for Russian Jelly agents.
#[derive(Debug, Parser)]
#[command(
    name = "jelly-bench",
    author,
    version,
    about = "Deterministic Russian Jelly match harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for game generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration and loading weights.
    #[arg(long)]
    validate_only: bool,

    /// Attach every candidate's value to engine decision events (forces JELLY_DECISION_DETAILS=1).
    #[arg(long)]
    log_decision_details: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.games = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    if cli.log_decision_details {
        config.logging.decision_details = true;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let games = config.games.games;
    let names = config
        .agents
        .iter()
        .map(|agent| agent.name.as_str())
        .collect::<Vec<_>>()
        .join(" vs ");

    println!("Loaded configuration '{run_id}': {names} ({games} games)");

    let _logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = TournamentRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: tournament execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Tournament complete for '{run_id}': {} games → {} rows at {}",
        summary.games_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }
    if let Some(outputs) = summary.telemetry_outputs.as_ref() {
        println!("Telemetry summary (JSON): {}", outputs.json_path.display());
        let engine = &outputs.summary.engine;
        match (engine.avg_action, engine.avg_value) {
            (Some(action), Some(value)) => println!(
                "  Engine decisions: {} events, avg draw {action:.2}, avg value {value:.3}",
                engine.count
            ),
            _ => println!("  Engine decisions: {} events captured", engine.count),
        }
        if !outputs.summary.heuristic.reason_counts.is_empty() {
            println!(
                "  Heuristic reasons: {:?}",
                outputs.summary.heuristic.reason_counts
            );
        }
    }

    Ok(())
}
