//! Signal evaluation
//!
//! Turns a snapshot into alert lines. Two policies share one interface:
//! - **Threshold**: flag every contract whose theta proxy implies a large
//!   move and whose delta is directional
//! - **Ranked**: top open-interest builders per class with a buy/avoid call
//!
//! An empty result means there is nothing to send.

mod ranked;
mod threshold;

pub use ranked::*;
pub use threshold::*;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::core::{AlertError, ContractQuote, Snapshot};
use crate::data::RollingAverages;

/// Produces ordered alert lines from a snapshot
pub trait SignalEvaluator {
    /// Name for logging
    fn name(&self) -> &str;

    fn evaluate(&self, snapshot: &Snapshot, rolling: Option<&RollingAverages>) -> Vec<String>;
}

/// Evaluation policy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    Threshold,
    Ranked,
}

impl EvaluationMode {
    /// Build the evaluator for this mode
    pub fn evaluator(&self, config: &EngineConfig) -> Box<dyn SignalEvaluator> {
        match self {
            EvaluationMode::Threshold => Box::new(ThresholdEvaluator::from_config(config)),
            EvaluationMode::Ranked => Box::new(RankedEvaluator::from_config(config)),
        }
    }
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationMode::Threshold => f.write_str("threshold"),
            EvaluationMode::Ranked => f.write_str("ranked"),
        }
    }
}

impl FromStr for EvaluationMode {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "threshold" => Ok(EvaluationMode::Threshold),
            "ranked" | "rank" => Ok(EvaluationMode::Ranked),
            other => Err(AlertError::config(format!("Unknown evaluation mode: {}", other))),
        }
    }
}

/// Nearest multiple of `step` to `spot`, halves rounded away from zero
/// (18025 -> 18050 on a 50 grid)
pub fn atm_strike(spot: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return spot;
    }
    (spot / step).round() * step
}

/// Rolling OI annotation suffix, empty when no average is known
fn rolling_note(quote: &ContractQuote, rolling: Option<&RollingAverages>) -> String {
    rolling
        .and_then(|r| r.get(&quote.key()))
        .map(|avg| format!(" | OI 3d avg: {:.0}", avg))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atm_strike_rounding() {
        assert_eq!(atm_strike(18012.35, 50.0), 18000.0);
        assert_eq!(atm_strike(18037.9, 50.0), 18050.0);
        // Midpoints round up
        assert_eq!(atm_strike(18025.0, 50.0), 18050.0);
        assert_eq!(atm_strike(18075.0, 50.0), 18100.0);
        assert_eq!(atm_strike(18024.99, 50.0), 18000.0);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Ranked".parse::<EvaluationMode>().unwrap(), EvaluationMode::Ranked);
        assert_eq!("threshold".parse::<EvaluationMode>().unwrap(), EvaluationMode::Threshold);
        assert!("momentum".parse::<EvaluationMode>().is_err());
        assert_eq!(EvaluationMode::Ranked.to_string(), "ranked");
    }

    #[test]
    fn test_mode_builds_evaluator() {
        let config = EngineConfig::default();
        assert_eq!(EvaluationMode::Threshold.evaluator(&config).name(), "threshold");
        assert_eq!(EvaluationMode::Ranked.evaluator(&config).name(), "ranked");
    }
}
