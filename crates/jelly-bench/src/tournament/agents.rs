use std::sync::Arc;

use jelly_bot::engine::DecisionEngine;
use jelly_bot::policy::{EnginePolicy, HeuristicPolicy, HeuristicStyle, Policy, RandomPolicy};
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent '{name}' needs engine weights but none were loaded")]
    MissingEngine { name: String },
    #[error("invalid {kind:?} parameter for agent '{name}': {message}")]
    InvalidParam {
        name: String,
        kind: AgentKind,
        message: String,
    },
}

/// Parsed agent definition from which a fresh policy is spawned per game.
pub(super) struct AgentBlueprint {
    pub(super) name: String,
    implementation: AgentImplementation,
}

enum AgentImplementation {
    Engine(EngineOptions),
    Heuristic(HeuristicStyle),
    Random,
}

#[derive(Clone, Copy)]
struct EngineOptions {
    temperature: f64,
}

impl AgentBlueprint {
    pub(super) fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let params = ParamReader::new(config)?;
        let implementation = match config.kind {
            AgentKind::Engine => {
                let temperature = params.f64("temperature")?.unwrap_or(0.0);
                if !temperature.is_finite() || temperature < 0.0 {
                    return Err(params.invalid(format!(
                        "temperature must be finite and non-negative, got {temperature}"
                    )));
                }
                AgentImplementation::Engine(EngineOptions { temperature })
            }
            AgentKind::Heuristic => {
                let style = match params.str("style")?.map(str::to_ascii_lowercase).as_deref() {
                    None | Some("cautious") => HeuristicStyle::Cautious,
                    Some("ratio") => HeuristicStyle::Ratio,
                    Some(other) => {
                        return Err(params.invalid(format!("unknown style '{other}'")));
                    }
                };
                AgentImplementation::Heuristic(style)
            }
            AgentKind::Random => AgentImplementation::Random,
        };
        Ok(Self {
            name: config.name.clone(),
            implementation,
        })
    }

    pub(super) fn needs_engine(&self) -> bool {
        matches!(self.implementation, AgentImplementation::Engine(_))
    }

    pub(super) fn spawn_policy(
        &self,
        engine: Option<&Arc<DecisionEngine>>,
        seed: u64,
    ) -> Result<Box<dyn Policy>, AgentError> {
        let policy: Box<dyn Policy> = match &self.implementation {
            AgentImplementation::Engine(opts) => {
                let engine = engine.ok_or_else(|| AgentError::MissingEngine {
                    name: self.name.clone(),
                })?;
                Box::new(
                    EnginePolicy::new(Arc::clone(engine), seed)
                        .with_temperature(opts.temperature)
                        .with_label(self.name.clone()),
                )
            }
            AgentImplementation::Heuristic(style) => Box::new(HeuristicPolicy::new(*style)),
            AgentImplementation::Random => Box::new(RandomPolicy::new(seed)),
        };
        Ok(policy)
    }
}

struct ParamReader<'a> {
    config: &'a AgentConfig,
    mapping: Option<&'a serde_yaml::Mapping>,
}

impl<'a> ParamReader<'a> {
    fn new(config: &'a AgentConfig) -> Result<Self, AgentError> {
        let mapping = if config.params.is_null() {
            None
        } else {
            Some(config.params.as_mapping().ok_or_else(|| AgentError::InvalidParam {
                name: config.name.clone(),
                kind: config.kind,
                message: "expected mapping for params".to_string(),
            })?)
        };
        Ok(Self { config, mapping })
    }

    fn invalid(&self, message: String) -> AgentError {
        AgentError::InvalidParam {
            name: self.config.name.clone(),
            kind: self.config.kind,
            message,
        }
    }

    fn get(&self, key: &str) -> Option<&'a serde_yaml::Value> {
        self.mapping?
            .iter()
            .find_map(|(k, v)| (k.as_str() == Some(key)).then_some(v))
    }

    fn f64(&self, key: &str) -> Result<Option<f64>, AgentError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.invalid(format!("{key} must be a number"))),
        }
    }

    fn str(&self, key: &str) -> Result<Option<&'a str>, AgentError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| self.invalid(format!("{key} must be a string"))),
        }
    }
}
