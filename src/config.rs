//! Engine configuration
//!
//! Numeric rules, file locations and pricing constants for one run, plus the
//! two identity values read from the environment.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::{AlertError, AlertResult};
use crate::signals::EvaluationMode;

/// Environment variable holding the Telegram bot token
pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
/// Environment variable holding the destination chat id
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";
/// Optional evaluation mode override ("threshold" / "ranked")
pub const MODE_VAR: &str = "ALERT_MODE";

/// Configuration for one engine cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Underlying index symbol
    pub symbol: String,
    /// Directory holding the chain cache artifact
    pub cache_dir: PathBuf,
    /// Directory holding daily open-interest logs
    pub logs_dir: PathBuf,
    /// Cache freshness window (minutes)
    pub cache_ttl_minutes: i64,
    /// Number of most recent history logs averaged
    pub history_depth: usize,
    /// Risk-free rate used for delta
    pub risk_free_rate: f64,
    /// Time to expiry in years, applied to every contract.
    /// Default: 3/365, not derived from the contract's expiry date.
    pub time_to_expiry_years: f64,
    /// Maximum characters per delivered chunk
    pub max_chunk_chars: usize,
    /// Which evaluator to run
    pub mode: EvaluationMode,
    /// Threshold mode rules
    pub threshold: ThresholdRules,
    /// Ranked mode rules
    pub ranking: RankingRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbol: "NIFTY".to_string(),
            cache_dir: PathBuf::from("cache"),
            logs_dir: PathBuf::from("logs"),
            cache_ttl_minutes: 10,
            history_depth: 3,
            risk_free_rate: 0.06,
            time_to_expiry_years: 3.0 / 365.0,
            max_chunk_chars: 3900,
            mode: EvaluationMode::Threshold,
            threshold: ThresholdRules::default(),
            ranking: RankingRules::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults with the mode taken from `ALERT_MODE` when set
    pub fn from_env() -> AlertResult<Self> {
        let mut config = Self::default();
        if let Ok(mode) = env::var(MODE_VAR) {
            config.mode = mode.parse()?;
        }
        Ok(config)
    }

    /// Ranked-mode preset
    pub fn ranked() -> Self {
        Self {
            mode: EvaluationMode::Ranked,
            ..Default::default()
        }
    }
}

/// Threshold mode: flag when `|theta * theta_factor| >= min_move`
/// and `|delta| > min_abs_delta`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdRules {
    /// Share of the theta proxy counted as potential move
    /// Default: 0.5
    pub theta_factor: f64,
    /// Minimum potential move in index points
    /// Default: 15.0
    pub min_move: f64,
    /// Strict lower bound on |delta|
    /// Default: 0.5
    pub min_abs_delta: f64,
}

impl Default for ThresholdRules {
    fn default() -> Self {
        Self {
            theta_factor: 0.5,
            min_move: 15.0,
            min_abs_delta: 0.5,
        }
    }
}

/// Ranked mode: top contracts per class by open-interest change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingRules {
    /// Contracts kept per class
    /// Default: 3
    pub top_n: usize,
    /// Delta bound for a `buy` (|delta| for puts)
    /// Default: 0.4
    pub min_delta: f64,
    /// Open-interest change bound for a `buy`
    /// Default: 10_000
    pub min_oi_change: i64,
    /// Strike grid used for the at-the-money strike
    /// Default: 50.0
    pub atm_step: f64,
}

impl Default for RankingRules {
    fn default() -> Self {
        Self {
            top_n: 3,
            min_delta: 0.4,
            min_oi_change: 10_000,
            atm_step: 50.0,
        }
    }
}

/// Alert channel identity
#[derive(Clone)]
pub struct Credentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl Credentials {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }

    /// Read `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`
    pub fn from_env() -> AlertResult<Self> {
        Ok(Self::new(required_var(BOT_TOKEN_VAR)?, required_var(CHAT_ID_VAR)?))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

fn required_var(name: &str) -> AlertResult<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AlertError::config(format!("{} is not set", name))),
    }
}
