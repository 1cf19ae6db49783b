use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LoggingConfig, ResolvedOutputs};

pub const TELEMETRY_FILE: &str = "telemetry.jsonl";

/// Handle for the structured log installed by [`init_logging`].
#[derive(Debug)]
pub struct LoggingGuard {
    pub telemetry_path: PathBuf,
}

/// Structured log location: next to the summary table.
pub fn telemetry_path(outputs: &ResolvedOutputs) -> PathBuf {
    outputs
        .summary_md
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(TELEMETRY_FILE)
}

/// Install the JSON subscriber when structured logging is enabled.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(
    logging: &LoggingConfig,
    outputs: &ResolvedOutputs,
    run_id: &str,
) -> Result<Option<LoggingGuard>> {
    if !logging.enable_structured {
        return Ok(None);
    }

    unsafe {
        std::env::set_var("JELLY_BENCH_RUN_ID", run_id);
        if logging.decision_details {
            std::env::set_var("JELLY_DECISION_DETAILS", "1");
        }
    }

    let telemetry_path = telemetry_path(outputs);
    let dir = telemetry_path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)
        .with_context(|| format!("creating telemetry directory at {}", dir.display()))?;
    // The appender only appends; start each run from an empty log.
    File::create(&telemetry_path)
        .with_context(|| format!("creating telemetry file at {}", telemetry_path.display()))?;

    // Events are written synchronously so the runner can digest the log
    // as soon as the last game ends.
    let writer = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(TELEMETRY_FILE)
        .build(dir)
        .with_context(|| format!("opening telemetry appender in {}", dir.display()))?;

    let level = logging.level().unwrap_or(Level::INFO);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer)
        .finish();

    // A subscriber may already be installed when several runs share one process.
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(Some(LoggingGuard { telemetry_path }))
}
