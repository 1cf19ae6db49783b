use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use jelly_bot::engine::{ActionRequest, DecisionEngine};

/// Ask the decision engine for a draw in a single position.
#[derive(Debug, Parser)]
#[command(name = "jelly-advise", author, version, about = "One-shot Russian Jelly move advice")]
struct Cli {
    /// Tokens left in the pool.
    #[arg(long)]
    remaining: usize,

    /// Own score minus opponent score.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    score_diff: f64,

    /// Bullets left in the pool; only known once one has been drawn.
    #[arg(long, value_name = "COUNT")]
    bullets: Option<usize>,

    /// Softmax temperature; 0 picks the best draw.
    #[arg(long, default_value_t = 0.0)]
    temperature: f64,

    /// Weights for the revealed-state evaluator.
    #[arg(long, env = "JELLY_VALUE_NET", value_name = "FILE")]
    value_net: PathBuf,

    /// Weights for the hidden-state evaluator.
    #[arg(long, env = "JELLY_INTUITION_NET", value_name = "FILE")]
    intuition_net: PathBuf,

    /// Print every candidate's expected value instead of a single choice.
    #[arg(long)]
    all: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let engine = DecisionEngine::from_files(&cli.value_net, &cli.intuition_net)
        .context("loading engine weights")?;

    let request = match cli.bullets {
        Some(bullets) => ActionRequest::post_reveal(cli.remaining, bullets, cli.score_diff),
        None => ActionRequest::pre_reveal(cli.remaining, cli.score_diff),
    }
    .with_temperature(cli.temperature);

    let output = if cli.all {
        serde_json::to_string_pretty(&engine.action_values(&request)?)?
    } else {
        serde_json::to_string_pretty(&engine.get_action(&request)?)?
    };
    println!("{output}");
    Ok(())
}
