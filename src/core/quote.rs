//! Option quote data
//!
//! A single contract observation and the snapshot that groups them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::greeks::theta_approx;
use super::option::{ContractKey, OptionType};

/// One option contract observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractQuote {
    /// Strike price
    pub strike: f64,
    /// Option type (CE/PE)
    pub option_type: OptionType,
    /// Last traded price
    pub last_price: f64,
    /// Implied volatility in percentage points (e.g. 14.5)
    pub implied_volatility: f64,
    /// Open interest
    pub open_interest: u64,
    /// Change in open interest since the prior session
    pub open_interest_change: i64,
    /// Expiry date
    pub expiry: NaiveDate,
    /// Underlying spot at snapshot time
    pub underlying_spot: f64,
    /// Theta proxy derived from last price
    pub theta: f64,
}

impl ContractQuote {
    /// Build a quote, deriving the theta column from `last_price`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        strike: f64,
        option_type: OptionType,
        last_price: f64,
        implied_volatility: f64,
        open_interest: u64,
        open_interest_change: i64,
        expiry: NaiveDate,
        underlying_spot: f64,
    ) -> Self {
        Self {
            strike,
            option_type,
            last_price,
            implied_volatility,
            open_interest,
            open_interest_change,
            expiry,
            underlying_spot,
            theta: theta_approx(last_price),
        }
    }

    pub fn key(&self) -> ContractKey {
        ContractKey::new(self.option_type, self.strike)
    }

    /// Short identity used in alert text, e.g. "CE 18000"
    pub fn label(&self) -> String {
        format!("{} {}", self.option_type, self.strike.trunc() as i64)
    }
}

/// Option chain snapshot captured at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Underlying symbol
    pub symbol: String,
    /// Underlying spot price
    pub spot: f64,
    /// Capture time
    pub captured_at: DateTime<Utc>,
    /// Contracts in exchange order
    pub contracts: Vec<ContractQuote>,
}

impl Snapshot {
    pub fn new(symbol: impl Into<String>, spot: f64) -> Self {
        Self {
            symbol: symbol.into(),
            spot,
            captured_at: Utc::now(),
            contracts: Vec::new(),
        }
    }

    /// Add a contract, forcing the shared spot
    pub fn push(&mut self, mut quote: ContractQuote) {
        quote.underlying_spot = self.spot;
        self.contracts.push(quote);
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    pub fn calls(&self) -> impl Iterator<Item = &ContractQuote> {
        self.of_type(OptionType::Call)
    }

    pub fn puts(&self) -> impl Iterator<Item = &ContractQuote> {
        self.of_type(OptionType::Put)
    }

    pub fn of_type(&self, option_type: OptionType) -> impl Iterator<Item = &ContractQuote> {
        self.contracts
            .iter()
            .filter(move |q| q.option_type == option_type)
    }

    /// Net change in open interest for one side of the chain
    pub fn total_oi_change(&self, option_type: OptionType) -> i64 {
        self.of_type(option_type).map(|q| q.open_interest_change).sum()
    }
}
