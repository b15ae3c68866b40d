//! # Walk-Forward Summaries
//!
//! Condenses a walk-forward result set into the figures a reviewer reads first:
//! how the top trial of each window fared out of sample, how the chained portfolio
//! simulations grew capital, and which parameter combinations kept winning.

pub mod error;
pub mod summary;

pub use error::WfoError;
pub use summary::{
    AggregatedPerformance, ParameterFrequency, ParameterKey, PortfolioChain, SimulationCounts,
    WalkForwardSummary, summarize,
};

use core_types::ResultSet;

/// Summarizes a loaded result set, which must be a walk-forward run.
pub fn summarize_set(set: &ResultSet) -> Result<WalkForwardSummary, WfoError> {
    match set {
        ResultSet::WalkForward(walk) => Ok(summarize(walk)),
        other => Err(WfoError::NotWalkForward(other.shape())),
    }
}
