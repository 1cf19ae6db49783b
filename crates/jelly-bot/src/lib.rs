pub mod engine;
pub mod eval;
pub mod policy;
pub mod weights;

pub use engine::{
    ActionChoice, ActionRequest, ActionValue, DecisionEngine, EngineError, EngineMode, NextState,
};
pub use eval::{EngineWeights, PostRevealEvaluator, PreRevealEvaluator};
pub use policy::{EnginePolicy, HeuristicPolicy, HeuristicStyle, Policy, PolicyContext, RandomPolicy};
pub use weights::{NetworkManifest, WeightError};
