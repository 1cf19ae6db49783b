use std::fs;
use std::path::Path;

use jelly_bench::config::BenchmarkConfig;
use jelly_bench::logging::init_logging;
use jelly_bench::telemetry::summarise_telemetry;
use jelly_bench::tournament::TournamentRunner;
use jelly_bot::eval::encode::{POST_REVEAL_INPUT, PRE_REVEAL_INPUT};
use jelly_bot::weights::NetworkManifest;
use tempfile::tempdir;

// Installs the global subscriber, so this file holds a single test.

fn structured_config(dir: &Path) -> BenchmarkConfig {
    NetworkManifest::zeros(POST_REVEAL_INPUT, [8, 8, 4])
        .with_value_bias(0.2)
        .to_file(dir.join("value_net.json"))
        .expect("write value net");
    NetworkManifest::zeros(PRE_REVEAL_INPUT, [8, 8, 4])
        .with_value_bias(-0.1)
        .to_file(dir.join("intuition_net.json"))
        .expect("write intuition net");

    let yaml = format!(
        r#"
run_id: "test_telemetry"
games:
  seed: 99
  games: 4
engine:
  value_net: "{value}"
  intuition_net: "{intuition}"
agents:
  - name: "cautious"
    kind: "heuristic"
    params:
      style: "cautious"
  - name: "engine"
    kind: "engine"
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
metrics:
  baseline: "cautious"
logging:
  enable_structured: true
  tracing_level: "info"
"#,
        value = dir.join("value_net.json").display(),
        intuition = dir.join("intuition_net.json").display(),
        jsonl = dir.join("games.jsonl").display(),
        summary = dir.join("summary.md").display(),
    );

    let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

#[test]
fn default_level_run_digests_decision_events() {
    unsafe {
        std::env::remove_var("RUST_LOG");
    }
    let dir = tempdir().expect("temp dir");
    let config = structured_config(dir.path());
    let outputs = config.resolved_outputs();

    let guard = init_logging(&config.logging, &outputs, &config.run_id)
        .expect("logging installs")
        .expect("structured logging enabled");
    let runner = TournamentRunner::new(config, outputs).expect("runner created");
    let summary = runner.run().expect("tournament completes");

    assert_eq!(summary.telemetry_path.as_ref(), Some(&guard.telemetry_path));
    let telemetry = summary
        .telemetry_outputs
        .as_ref()
        .expect("telemetry digest written");
    assert!(telemetry.json_path.exists());
    assert!(
        telemetry.summary.engine.count > 0,
        "engine decisions missing from the log"
    );
    assert!(telemetry.summary.engine.avg_action.is_some());
    assert!(!telemetry.summary.engine.mode_counts.is_empty());
    assert!(
        !telemetry.summary.heuristic.reason_counts.is_empty(),
        "heuristic decisions missing from the log"
    );

    let reread = summarise_telemetry(&guard.telemetry_path).expect("log parses");
    assert!(reread.engine.count >= telemetry.summary.engine.count);

    let markdown = fs::read_to_string(dir.path().join("summary.md")).expect("summary");
    assert!(markdown.contains("| engine | Engine | 4 |"));
    assert!(markdown.contains("## Telemetry Highlights"));
}
