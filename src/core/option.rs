//! Option contract identity
//!
//! Option class (call/put) with its exchange codes, and the key used to
//! correlate a contract across snapshots.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::AlertError;

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    #[serde(rename = "CE")]
    Call,
    #[serde(rename = "PE")]
    Put,
}

impl OptionType {
    /// Exchange code ("CE" / "PE")
    pub fn code(&self) -> &'static str {
        match self {
            OptionType::Call => "CE",
            OptionType::Put => "PE",
        }
    }

    /// Plural label used in alert blocks
    pub fn label(&self) -> &'static str {
        match self {
            OptionType::Call => "CALLS",
            OptionType::Put => "PUTS",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OptionType {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CE" | "CALL" | "C" => Ok(OptionType::Call),
            "PE" | "PUT" | "P" => Ok(OptionType::Put),
            other => Err(AlertError::data(format!("Unknown option type: {}", other))),
        }
    }
}

/// Contract identity across snapshots: option class + strike.
///
/// Strikes are held in hundredths so the key is hashable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractKey {
    pub option_type: OptionType,
    strike_cents: i64,
}

impl ContractKey {
    pub fn new(option_type: OptionType, strike: f64) -> Self {
        Self {
            option_type,
            strike_cents: (strike * 100.0).round() as i64,
        }
    }

    pub fn strike(&self) -> f64 {
        self.strike_cents as f64 / 100.0
    }
}

impl fmt::Display for ContractKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.option_type, self.strike())
    }
}
