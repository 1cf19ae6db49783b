use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind, BenchmarkConfig};
use crate::tournament::{DecisionSummary, GameOutcome, GameResult};

const CONFIDENCE_Z: f64 = 1.96; // 95% CI

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline agent '{0}' not present in tournament results")]
    MissingBaseline(String),
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub struct AnalyticsCollector {
    baseline: String,
    agents: HashMap<String, AgentAccumulator>,
    comparisons: HashMap<String, ComparisonAccumulator>,
    agent_order: Vec<String>,
    latency_budget_ms: u64,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .metrics
            .baseline
            .clone()
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;

        if !config.agents.iter().any(|agent| agent.name == baseline) {
            return Err(AnalyticsError::MissingBaseline(baseline));
        }

        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.clone(), config.metrics.latency_budget_ms),
            );
            order.push(agent.name.clone());
        }

        Ok(Self {
            baseline,
            agents,
            comparisons: HashMap::new(),
            agent_order: order,
            latency_budget_ms: config.metrics.latency_budget_ms,
        })
    }

    pub fn record_game(&mut self, outcome: &GameOutcome) -> Result<(), AnalyticsError> {
        for seat in &outcome.seat_results {
            let acc = self
                .agents
                .get_mut(&seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;

            acc.record_game(
                seat.differential as f64,
                seat.result,
                seat.went_first,
                &seat.metrics,
            );
        }

        // Two seats only, so a differential already pairs the agent against the baseline.
        for seat in &outcome.seat_results {
            if seat.agent_name == self.baseline {
                continue;
            }
            self.comparisons
                .entry(seat.agent_name.clone())
                .or_insert_with(ComparisonAccumulator::new)
                .record(seat.differential as f64);
        }

        Ok(())
    }

    pub fn finalize(mut self) -> Result<AnalyticsSummary, AnalyticsError> {
        let mut reports = Vec::new();
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                reports.push(acc.into_report());
            }
        }

        let mut comparisons = Vec::new();
        for report in &reports {
            if report.name == self.baseline {
                comparisons.push(ComparisonReport {
                    agent: report.name.clone(),
                    p_value: 1.0,
                    sample_size: report.games,
                });
                continue;
            }
            let (p_value, sample_size) = match self.comparisons.remove(&report.name) {
                Some(comp) => comp.wilcoxon_signed_rank(),
                None => (1.0, 0),
            };
            comparisons.push(ComparisonReport {
                agent: report.name.clone(),
                p_value,
                sample_size,
            });
        }

        Ok(AnalyticsSummary {
            baseline: self.baseline,
            agents: reports,
            comparisons,
            latency_budget_ms: self.latency_budget_ms,
        })
    }
}

struct AgentAccumulator {
    config: AgentConfig,
    games: u32,
    wins: u32,
    draws: u32,
    losses: u32,
    first_mover_wins: u32,
    first_mover_games: u32,
    per_game_diffs: Vec<f64>,
    total_latency_ms: f64,
    total_decisions: u64,
    latency_budget_ms: u64,
}

impl AgentAccumulator {
    fn new(config: AgentConfig, latency_budget_ms: u64) -> Self {
        Self {
            config,
            games: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            first_mover_wins: 0,
            first_mover_games: 0,
            per_game_diffs: Vec::new(),
            total_latency_ms: 0.0,
            total_decisions: 0,
            latency_budget_ms,
        }
    }

    fn record_game(
        &mut self,
        differential: f64,
        result: GameResult,
        went_first: bool,
        metrics: &DecisionSummary,
    ) {
        self.games += 1;
        self.per_game_diffs.push(differential);
        match result {
            GameResult::Win => self.wins += 1,
            GameResult::Draw => self.draws += 1,
            GameResult::Loss => self.losses += 1,
        }
        if went_first {
            self.first_mover_games += 1;
            if result == GameResult::Win {
                self.first_mover_wins += 1;
            }
        }
        self.total_latency_ms += metrics.total_ms;
        self.total_decisions += u64::from(metrics.decisions);
    }

    fn into_report(self) -> AgentReport {
        let avg_diff = mean(&self.per_game_diffs);
        let (ci_low, ci_high) = confidence_interval(&self.per_game_diffs);

        let avg_latency = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };

        AgentReport {
            name: self.config.name,
            kind: self.config.kind,
            params: self.config.params,
            games: self.games as usize,
            wins: self.wins as usize,
            draws: self.draws as usize,
            losses: self.losses as usize,
            first_mover_games: self.first_mover_games as usize,
            first_mover_wins: self.first_mover_wins as usize,
            avg_differential: avg_diff,
            ci95: (ci_low, ci_high),
            average_ms_per_decision: avg_latency,
            over_budget: avg_latency > self.latency_budget_ms as f64,
        }
    }
}

#[derive(Clone)]
struct ComparisonAccumulator {
    diffs: Vec<f64>,
}

impl ComparisonAccumulator {
    fn new() -> Self {
        Self { diffs: Vec::new() }
    }

    fn record(&mut self, diff: f64) {
        self.diffs.push(diff);
    }

    /// Two-sided normal approximation with tie and continuity corrections.
    fn wilcoxon_signed_rank(self) -> (f64, usize) {
        let diffs: Vec<f64> = self
            .diffs
            .into_iter()
            .filter(|d| d.is_finite() && d.abs() > f64::EPSILON)
            .collect();
        let n = diffs.len();
        if n == 0 {
            return (1.0, 0);
        }

        let mut paired: Vec<(f64, f64)> =
            diffs.into_iter().map(|d| (d.abs(), d.signum())).collect();
        paired.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut ranks = Vec::with_capacity(n);
        let mut tie_sizes = Vec::new();
        let mut i = 0;
        while i < paired.len() {
            let mut j = i;
            while j + 1 < paired.len() && (paired[j + 1].0 - paired[i].0).abs() < 1e-12 {
                j += 1;
            }
            let rank = (i + j + 2) as f64 / 2.0;
            for entry in &paired[i..=j] {
                ranks.push((rank, entry.1));
            }
            if j > i {
                tie_sizes.push(j - i + 1);
            }
            i = j + 1;
        }

        let w_plus: f64 = ranks
            .iter()
            .filter(|(_, sign)| *sign > 0.0)
            .map(|(rank, _)| *rank)
            .sum();
        let w_minus: f64 = ranks
            .iter()
            .filter(|(_, sign)| *sign < 0.0)
            .map(|(rank, _)| *rank)
            .sum();

        let w = w_plus.min(w_minus);
        let n_f = n as f64;
        let mean_w = n_f * (n_f + 1.0) / 4.0;

        let tie_adjustment: f64 = tie_sizes
            .into_iter()
            .map(|count| {
                let c = count as f64;
                (c.powi(3) - c) / 48.0
            })
            .sum();
        let variance_w = n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0 - tie_adjustment;
        if variance_w <= 0.0 {
            return (1.0, n);
        }

        let z = (((w - mean_w).abs() - 0.5) / variance_w.sqrt()).max(0.0);
        let Ok(normal) = Normal::new(0.0, 1.0) else {
            return (1.0, n);
        };
        let p = 2.0 * (1.0 - normal.cdf(z));
        (p.clamp(0.0, 1.0), n)
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub agents: Vec<AgentReport>,
    pub comparisons: Vec<ComparisonReport>,
    pub latency_budget_ms: u64,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Tournament Summary\n\n");
        rows.push_str(&format!("Baseline: {}\n\n", self.baseline));
        rows.push_str(&format!(
            "Latency budget: {} ms average per decision\n\n",
            self.latency_budget_ms
        ));
        rows.push_str("| Agent | Kind | Games | Win % | Draw % | Loss % | First-move Win % | Avg diff | 95% CI | Avg ms/decision | Over Budget | p-value |\n");
        rows.push_str("|-------|------|-------|-------|--------|--------|------------------|----------|--------|------------------|-------------|---------|\n");

        for agent in &self.agents {
            let comparison = self
                .comparisons
                .iter()
                .find(|c| c.agent == agent.name)
                .map(|c| c.p_value)
                .unwrap_or(1.0);

            rows.push_str(&format!(
                "| {name} | {kind:?} | {games} | {win:.1}% | {draw:.1}% | {loss:.1}% | {first:.1}% | {avg:+.2} | [{ci_low:.2}, {ci_high:.2}] | {latency:.3} | {over_budget} | {pval:.3} |\n",
                name = agent.name,
                kind = agent.kind,
                games = agent.games,
                win = percentage(agent.wins, agent.games),
                draw = percentage(agent.draws, agent.games),
                loss = percentage(agent.losses, agent.games),
                first = percentage(agent.first_mover_wins, agent.first_mover_games),
                avg = agent.avg_differential,
                ci_low = agent.ci95.0,
                ci_high = agent.ci95.1,
                latency = agent.average_ms_per_decision,
                over_budget = if agent.over_budget { "Yes" } else { "No" },
                pval = comparison,
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub params: serde_yaml::Value,
    pub games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub first_mover_games: usize,
    pub first_mover_wins: usize,
    pub avg_differential: f64,
    pub ci95: (f64, f64),
    pub average_ms_per_decision: f64,
    #[serde(skip)]
    pub over_budget: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub agent: String,
    pub p_value: f64,
    pub sample_size: usize,
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn confidence_interval(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = mean(values);
    if values.len() == 1 {
        return (mean, mean);
    }
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (values.len() as f64 - 1.0);
    let std_error = (variance / values.len() as f64).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    (mean - margin, mean + margin)
}
