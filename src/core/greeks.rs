//! Option Greeks
//!
//! Per-contract sensitivities used by the signal rules. Only delta is an
//! analytic Black-Scholes value; theta is a linear proxy on last price.

use serde::{Deserialize, Serialize};

use super::quote::ContractQuote;
use crate::models::black_scholes;

/// Crude time-decay proxy: `-|last_price| * 10/7`.
///
/// Not a pricing derivative. Stands in for analytic theta in the alert rules.
pub fn theta_approx(last_price: f64) -> f64 {
    -last_price.abs() * 10.0 / 7.0
}

/// Greeks derived for one contract (ephemeral, never stored)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Delta: dV/dS, 0.0 when inputs are degenerate
    pub delta: f64,
    /// Theta proxy (see [`theta_approx`])
    pub theta: f64,
}

impl Greeks {
    pub fn new(delta: f64, theta: f64) -> Self {
        Self { delta, theta }
    }

    /// Compute Greeks for a quote. IV is converted from percentage points.
    pub fn for_quote(quote: &ContractQuote, spot: f64, time: f64, rate: f64) -> Self {
        let delta = black_scholes::delta(
            spot,
            quote.strike,
            time,
            rate,
            quote.implied_volatility / 100.0,
            quote.option_type,
        );
        Self::new(delta, quote.theta)
    }
}
