//! Threshold rule: large theta-implied move on a directional contract

use crate::config::{EngineConfig, ThresholdRules};
use crate::core::{Greeks, Snapshot};
use crate::data::RollingAverages;

use super::{rolling_note, SignalEvaluator};

/// Header line preceding flagged contracts
pub const THRESHOLD_HEADER: &str = "🚨 Trade Alert:";

/// Flags contracts with `|theta * factor| >= min_move` and `|delta| > min_abs_delta`
#[derive(Debug, Clone)]
pub struct ThresholdEvaluator {
    rules: ThresholdRules,
    time_to_expiry: f64,
    risk_free_rate: f64,
}

impl ThresholdEvaluator {
    pub fn new(rules: ThresholdRules, time_to_expiry: f64, risk_free_rate: f64) -> Self {
        Self {
            rules,
            time_to_expiry,
            risk_free_rate,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.threshold.clone(), config.time_to_expiry_years, config.risk_free_rate)
    }

    /// Whether a contract with these Greeks passes both rules
    pub fn is_flagged(&self, greeks: &Greeks) -> bool {
        let potential_move = (greeks.theta * self.rules.theta_factor).abs();
        potential_move >= self.rules.min_move && greeks.delta.abs() > self.rules.min_abs_delta
    }
}

impl SignalEvaluator for ThresholdEvaluator {
    fn name(&self) -> &str {
        "threshold"
    }

    fn evaluate(&self, snapshot: &Snapshot, rolling: Option<&RollingAverages>) -> Vec<String> {
        let mut alerts = Vec::new();

        for quote in &snapshot.contracts {
            let greeks =
                Greeks::for_quote(quote, snapshot.spot, self.time_to_expiry, self.risk_free_rate);
            if !self.is_flagged(&greeks) {
                continue;
            }

            alerts.push(format!(
                "{} | LTP: ₹{:.2}, Δ: {:.2}, Θ: {:.1} ⚠️ Move > {}pts{}",
                quote.label(),
                quote.last_price,
                greeks.delta,
                greeks.theta,
                self.rules.min_move,
                rolling_note(quote, rolling),
            ));
        }

        if alerts.is_empty() {
            return alerts;
        }

        tracing::debug!("{} contracts flagged by threshold rules", alerts.len());
        let mut lines = Vec::with_capacity(alerts.len() + 1);
        lines.push(THRESHOLD_HEADER.to_string());
        lines.extend(alerts);
        lines
    }
}
