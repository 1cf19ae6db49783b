mod agents;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchmarkConfig, ResolvedOutputs};
use crate::logging::telemetry_path;
use crate::telemetry::{
    TelemetryError, TelemetryOutputs, append_highlights_to_markdown, write_summary_outputs,
};
use jelly_bot::engine::{DecisionEngine, EngineError};
use jelly_bot::policy::{Policy, PolicyContext};
use jelly_bot::weights::WeightError;
use jelly_core::game::match_state::{GameError, MatchState};
use jelly_core::model::player::Player;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

pub use agents::AgentError;
use agents::AgentBlueprint;

/// Primary entry point for orchestrating tournaments.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    engine: Option<Arc<DecisionEngine>>,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
    pub telemetry_outputs: Option<TelemetryOutputs>,
}

impl TournamentRunner {
    /// Build a runner from a validated configuration, loading engine weights once.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;

        if agents.len() != Player::BOTH.len() {
            return Err(RunnerError::SeatCount {
                found: agents.len(),
            });
        }

        let engine = if agents.iter().any(AgentBlueprint::needs_engine) {
            let weights = config.engine.as_ref().ok_or(RunnerError::MissingWeights)?;
            let engine = DecisionEngine::from_files(&weights.value_net, &weights.intuition_net)?
                .with_decision_details(config.logging.decision_details);
            event!(
                target: "jelly_bench::tournament",
                Level::INFO,
                value_net = %weights.value_net.display(),
                intuition_net = %weights.intuition_net.display(),
                "engine weights loaded"
            );
            Some(Arc::new(engine))
        } else {
            None
        };

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
            engine,
        })
    }

    /// Execute the tournament, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config)?;

        for game_index in 0..self.config.games.games {
            let game_seed = rng.next_u64();
            let outcome = self.play_game(game_index, game_seed)?;
            analytics.record_game(&outcome)?;
            rows_written += write_game_rows(&mut writer, &self.config, game_index, &outcome)?;
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| telemetry_path(&self.outputs));

        let telemetry_outputs = match telemetry_path.as_ref() {
            Some(path) => {
                let dir = path.parent().unwrap_or_else(|| Path::new("."));
                write_summary_outputs(path, dir)?
            }
            None => None,
        };

        if let Some(outputs) = telemetry_outputs.as_ref() {
            append_highlights_to_markdown(&self.outputs.summary_md, outputs)?;
        }

        Ok(RunSummary {
            games_played: self.config.games.games,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
            telemetry_outputs,
        })
    }

    /// Player who opens game `game_index`.
    fn starting_player(&self, game_index: usize) -> Player {
        if self.config.games.swap_seats && game_index % 2 == 1 {
            Player::Two
        } else {
            Player::One
        }
    }

    fn play_game(&self, game_index: usize, game_seed: u64) -> Result<GameOutcome, RunnerError> {
        let starting = self.starting_player(game_index);
        let mut match_state = MatchState::with_seed(starting, game_seed);
        let mut seats = build_seat_states(&self.agents, self.engine.as_ref(), game_seed)?;
        let mut reveal_turn = None;

        while !match_state.is_finished() {
            let player = match_state.current_turn();
            let observation = match_state.observation(player);
            let seat = &mut seats[player.index()];

            let ctx = PolicyContext::new(player, &observation);
            let start = Instant::now();
            let (draw, value) =
                seat.policy
                    .choose_with_value(&ctx)
                    .map_err(|source| RunnerError::Policy {
                        agent: seat.agent_name.clone(),
                        source,
                    })?;
            let elapsed_ms = seat.metrics.record(start.elapsed());

            let record = match_state.draw(draw)?;
            if record.revealed_now {
                reveal_turn = Some(match_state.turns_played());
            }

            if self.logging_enabled && tracing::enabled!(Level::INFO) {
                event!(
                    target: "jelly_bench::draw",
                    Level::INFO,
                    run_id = %self.config.run_id,
                    game_index = game_index as u32,
                    seat = seat_label(player),
                    agent = %seat.agent_name,
                    remaining = observation.remaining as u32,
                    score_diff = observation.score_diff,
                    revealed = observation.bullet_revealed,
                    draw = draw as u32,
                    bullets_drawn = record.outcome.bullets_drawn as u32,
                    points = record.points,
                    value,
                    elapsed_ms
                );
            }
        }

        let winner = match_state.winner();
        let scores = match_state.scores();
        let seat_results = seats
            .into_iter()
            .map(|seat| SeatResult {
                result: GameResult::for_player(seat.player, winner),
                score: scores.score(seat.player),
                differential: scores.differential(seat.player),
                went_first: seat.player == starting,
                metrics: seat.metrics.finalize(),
                agent_name: seat.agent_name,
                player: seat.player,
            })
            .collect();

        Ok(GameOutcome {
            game_seed,
            starting,
            winner,
            total_bullets: match_state.total_bullets(),
            turns: match_state.turns_played(),
            reveal_turn,
            seat_results,
        })
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_rows(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    game_index: usize,
    outcome: &GameOutcome,
) -> Result<usize, RunnerError> {
    let game_id = format!("G{game_index:05}");

    let mut rows_written = 0usize;
    for seat_result in &outcome.seat_results {
        let row = GameLogRow {
            run_id: config.run_id.clone(),
            game_id: game_id.clone(),
            game_index,
            game_seed: outcome.game_seed,
            seat: seat_label(seat_result.player).to_string(),
            started: seat_result.went_first,
            agent: seat_result.agent_name.clone(),
            score: seat_result.score,
            differential: seat_result.differential,
            result: seat_result.result,
            decisions: seat_result.metrics.decisions,
            speed_ms_turn: seat_result.metrics.avg_ms_per_decision,
            turns: outcome.turns,
            reveal_turn: outcome.reveal_turn,
            bullets: outcome.total_bullets,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

/// Agent `i` always sits at `Player::from_index(i)`; only the opener changes.
fn build_seat_states(
    agents: &[AgentBlueprint],
    engine: Option<&Arc<DecisionEngine>>,
    game_seed: u64,
) -> Result<Vec<SeatState>, RunnerError> {
    let mut seats = Vec::with_capacity(agents.len());
    for (index, agent) in agents.iter().enumerate() {
        let player = Player::from_index(index).ok_or(RunnerError::SeatCount {
            found: agents.len(),
        })?;
        let policy_seed = game_seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        seats.push(SeatState {
            player,
            agent_name: agent.name.clone(),
            policy: agent.spawn_policy(engine, policy_seed)?,
            metrics: DecisionMetrics::default(),
        });
    }
    Ok(seats)
}

fn seat_label(player: Player) -> &'static str {
    match player {
        Player::One => "one",
        Player::Two => "two",
    }
}

struct SeatState {
    player: Player,
    agent_name: String,
    policy: Box<dyn Policy>,
    metrics: DecisionMetrics,
}

pub struct GameOutcome {
    pub game_seed: u64,
    pub starting: Player,
    pub winner: Option<Player>,
    pub total_bullets: usize,
    pub turns: u32,
    /// Turn number on which the first bullet came out.
    pub reveal_turn: Option<u32>,
    pub seat_results: Vec<SeatResult>,
}

pub struct SeatResult {
    pub agent_name: String,
    pub player: Player,
    pub score: i64,
    pub differential: i64,
    pub result: GameResult,
    pub went_first: bool,
    pub metrics: DecisionSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Win,
    Draw,
    Loss,
}

impl GameResult {
    fn for_player(player: Player, winner: Option<Player>) -> Self {
        match winner {
            None => GameResult::Draw,
            Some(w) if w == player => GameResult::Win,
            Some(_) => GameResult::Loss,
        }
    }
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) -> f64 {
        self.total += duration;
        self.decisions += 1;
        duration.as_secs_f64() * 1000.0
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct GameLogRow {
    run_id: String,
    game_id: String,
    game_index: usize,
    game_seed: u64,
    seat: String,
    started: bool,
    agent: String,
    score: i64,
    differential: i64,
    result: GameResult,
    decisions: u32,
    speed_ms_turn: f64,
    turns: u32,
    reveal_turn: Option<u32>,
    bullets: usize,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game execution failed: {0}")]
    Game(#[from] GameError),
    #[error("agent '{agent}' failed to choose a draw: {source}")]
    Policy {
        agent: String,
        #[source]
        source: EngineError,
    },
    #[error("configuration requires exactly 2 agents but found {found}")]
    SeatCount { found: usize },
    #[error("an engine agent is configured but no weights were given")]
    MissingWeights,
    #[error("failed to load engine weights: {0}")]
    Weights(#[from] WeightError),
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("telemetry summarisation failed: {0}")]
    Telemetry(#[from] TelemetryError),
}
