//! Aggregation of the structured decision log written during a run.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const ENGINE_TARGET: &str = "jelly_bot::engine";
const HEURISTIC_TARGET: &str = "jelly_bot::heuristic";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse telemetry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize)]
pub struct TelemetrySummary {
    pub engine: EngineTelemetrySummary,
    pub heuristic: HeuristicTelemetrySummary,
}

#[derive(Debug, Default, Serialize)]
pub struct EngineTelemetrySummary {
    pub count: usize,
    pub avg_action: Option<f64>,
    pub avg_value: Option<f64>,
    pub mode_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Default, Serialize)]
pub struct HeuristicTelemetrySummary {
    pub reason_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Default)]
struct Average {
    sum: f64,
    count: usize,
}

impl Average {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

fn label(fields: &serde_json::Map<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("<unset>")
        .to_string()
}

/// Aggregate engine and heuristic decision events from a JSON log.
pub fn summarise_telemetry(path: &Path) -> Result<TelemetrySummary, TelemetryError> {
    if !path.exists() {
        return Ok(TelemetrySummary::default());
    }

    let file = File::open(path).map_err(|source| TelemetryError::Io {
        context: "opening telemetry log",
        source,
    })?;
    let reader = BufReader::new(file);

    let mut summary = TelemetrySummary::default();
    let mut action_avg = Average::default();
    let mut value_avg = Average::default();

    for line in reader.lines() {
        let line = line.map_err(|source| TelemetryError::Io {
            context: "reading telemetry line",
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let payload: Value = serde_json::from_str(&line)?;
        let target = payload
            .get("target")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let Some(fields) = payload.get("fields").and_then(Value::as_object) else {
            continue;
        };

        match target {
            ENGINE_TARGET => {
                summary.engine.count += 1;
                if let Some(action) = fields.get("action").and_then(Value::as_f64) {
                    action_avg.add(action);
                }
                if let Some(value) = fields.get("value").and_then(Value::as_f64) {
                    value_avg.add(value);
                }
                *summary
                    .engine
                    .mode_counts
                    .entry(label(fields, "mode"))
                    .or_insert(0) += 1;
            }
            HEURISTIC_TARGET => {
                *summary
                    .heuristic
                    .reason_counts
                    .entry(label(fields, "reason"))
                    .or_insert(0) += 1;
            }
            _ => {}
        }
    }

    summary.engine.avg_action = action_avg.mean();
    summary.engine.avg_value = value_avg.mean();
    Ok(summary)
}

#[derive(Debug)]
pub struct TelemetryOutputs {
    pub summary: TelemetrySummary,
    pub json_path: PathBuf,
}

/// Write `telemetry_summary.json` into `output_dir` when a log exists.
pub fn write_summary_outputs(
    telemetry_path: &Path,
    output_dir: &Path,
) -> Result<Option<TelemetryOutputs>, TelemetryError> {
    if !telemetry_path.exists() {
        return Ok(None);
    }

    let summary = summarise_telemetry(telemetry_path)?;
    let json_path = output_dir.join("telemetry_summary.json");
    std::fs::write(&json_path, serde_json::to_vec_pretty(&summary)?).map_err(|source| {
        TelemetryError::Io {
            context: "writing telemetry summary json",
            source,
        }
    })?;

    Ok(Some(TelemetryOutputs { summary, json_path }))
}

/// Append a short decision digest to an existing Markdown summary.
pub fn append_highlights_to_markdown(
    summary_path: &Path,
    outputs: &TelemetryOutputs,
) -> Result<(), TelemetryError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(summary_path)
        .map_err(|source| TelemetryError::Io {
            context: "opening summary markdown for telemetry append",
            source,
        })?;

    let engine = &outputs.summary.engine;
    let mut section = String::new();
    section.push_str("\n## Telemetry Highlights\n");
    section.push_str(&format!("- Engine decisions captured: {}\n", engine.count));
    if let Some(value) = engine.avg_action {
        section.push_str(&format!("- Avg tokens drawn: {value:.2}\n"));
    }
    if let Some(value) = engine.avg_value {
        section.push_str(&format!("- Avg expected value: {value:.3}\n"));
    }
    for (mode, count) in &engine.mode_counts {
        section.push_str(&format!("- Mode {mode}: {count}\n"));
    }

    let heuristic = &outputs.summary.heuristic;
    if !heuristic.reason_counts.is_empty() {
        section.push_str("\n### Heuristic Reasons\n");
        for (reason, count) in &heuristic.reason_counts {
            section.push_str(&format!("- {reason}: {count}\n"));
        }
    }

    write!(file, "{section}").map_err(|source| TelemetryError::Io {
        context: "writing telemetry highlights",
        source,
    })?;
    Ok(())
}
