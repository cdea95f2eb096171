//! Ranked rule: top open-interest builders per option class

use std::cmp::Ordering;
use std::fmt;

use crate::config::{EngineConfig, RankingRules};
use crate::core::{ContractQuote, Greeks, OptionType, Snapshot};
use crate::data::RollingAverages;

use super::{atm_strike, rolling_note, SignalEvaluator};

/// Overall positioning read from open-interest change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketTone {
    /// Put writers adding more than call writers
    Bullish,
    /// Call writers adding more than put writers
    Bearish,
    Neutral,
}

impl MarketTone {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let calls = snapshot.total_oi_change(OptionType::Call);
        let puts = snapshot.total_oi_change(OptionType::Put);
        match puts.cmp(&calls) {
            Ordering::Greater => MarketTone::Bullish,
            Ordering::Less => MarketTone::Bearish,
            Ordering::Equal => MarketTone::Neutral,
        }
    }
}

impl fmt::Display for MarketTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MarketTone::Bullish => "Bullish 📈",
            MarketTone::Bearish => "Bearish 📉",
            MarketTone::Neutral => "Neutral ⚖️",
        };
        f.write_str(label)
    }
}

/// Recommended action for a ranked contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Avoid,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => f.write_str("buy"),
            Action::Avoid => f.write_str("avoid"),
        }
    }
}

/// A contract selected by the ranking
#[derive(Debug, Clone)]
pub struct RankedContract<'a> {
    pub quote: &'a ContractQuote,
    pub greeks: Greeks,
    pub action: Action,
}

/// Ranks contracts by open-interest change within each class
#[derive(Debug, Clone)]
pub struct RankedEvaluator {
    rules: RankingRules,
    time_to_expiry: f64,
    risk_free_rate: f64,
}

impl RankedEvaluator {
    pub fn new(rules: RankingRules, time_to_expiry: f64, risk_free_rate: f64) -> Self {
        Self {
            rules,
            time_to_expiry,
            risk_free_rate,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.ranking.clone(), config.time_to_expiry_years, config.risk_free_rate)
    }

    /// Top `top_n` contracts of one class, largest OI change first.
    /// Ties keep snapshot order.
    pub fn rank<'a>(
        &self,
        snapshot: &'a Snapshot,
        option_type: OptionType,
    ) -> Vec<RankedContract<'a>> {
        let mut side: Vec<&ContractQuote> = snapshot.of_type(option_type).collect();
        side.sort_by(|a, b| b.open_interest_change.cmp(&a.open_interest_change));

        side.into_iter()
            .take(self.rules.top_n)
            .map(|quote| {
                let greeks = Greeks::for_quote(
                    quote,
                    snapshot.spot,
                    self.time_to_expiry,
                    self.risk_free_rate,
                );
                RankedContract {
                    quote,
                    greeks,
                    action: self.action(quote, &greeks),
                }
            })
            .collect()
    }

    pub fn action(&self, quote: &ContractQuote, greeks: &Greeks) -> Action {
        let delta_ok = match quote.option_type {
            OptionType::Call => greeks.delta > self.rules.min_delta,
            OptionType::Put => greeks.delta.abs() > self.rules.min_delta,
        };

        if delta_ok && quote.open_interest_change > self.rules.min_oi_change {
            Action::Buy
        } else {
            Action::Avoid
        }
    }

    fn block(
        &self,
        option_type: OptionType,
        ranked: &[RankedContract<'_>],
        rolling: Option<&RollingAverages>,
    ) -> Vec<String> {
        let mut lines = vec![format!("{} (top OI change):", option_type.label())];
        if ranked.is_empty() {
            lines.push("  none".to_string());
        }
        for entry in ranked {
            lines.push(format!(
                "{} | LTP: ₹{:.2} | ΔOI: {:+} | Δ: {:.2} → {}{}",
                entry.quote.label(),
                entry.quote.last_price,
                entry.quote.open_interest_change,
                entry.greeks.delta,
                entry.action,
                rolling_note(entry.quote, rolling),
            ));
        }
        lines
    }
}

impl SignalEvaluator for RankedEvaluator {
    fn name(&self) -> &str {
        "ranked"
    }

    fn evaluate(&self, snapshot: &Snapshot, rolling: Option<&RollingAverages>) -> Vec<String> {
        let calls = self.rank(snapshot, OptionType::Call);
        let puts = self.rank(snapshot, OptionType::Put);
        if calls.is_empty() && puts.is_empty() {
            return Vec::new();
        }

        let mut lines = vec![
            format!("📊 {} Option Signals", snapshot.symbol),
            format!("Market tone: {}", MarketTone::from_snapshot(snapshot)),
            format!(
                "Spot: {:.2} | ATM: {:.0}",
                snapshot.spot,
                atm_strike(snapshot.spot, self.rules.atm_step)
            ),
            String::new(),
        ];
        lines.extend(self.block(OptionType::Call, &calls, rolling));
        lines.push(String::new());
        lines.extend(self.block(OptionType::Put, &puts, rolling));
        lines
    }
}
