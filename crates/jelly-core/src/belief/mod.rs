//! Posterior over the hidden bullet count while no bullet has been seen.
//!
//! This module is composed of:
//! - `distribution`: the analytic posterior for a given remaining-pool size.
//! - `cache`: memoization keyed by remaining-pool size, safe to share across threads.
//! - `telemetry`: summary metrics for logging.

mod cache;
mod distribution;
pub mod telemetry;

pub use cache::{BeliefCache, CacheStats};
pub use distribution::{BeliefDistribution, BeliefError, PRIOR_EPSILON};
