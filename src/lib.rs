//! # NIFTY Alerts - Option Chain Signal Engine
//!
//! A read-only advisory pipeline for NIFTY index options on NSE.
//!
//! ## Overview
//!
//! Each run:
//! - **Acquires** the option chain, reusing a short-lived local cache
//! - **Remembers** open interest across recent sessions
//! - **Evaluates** delta and a theta proxy per contract against alert rules
//! - **Dispatches** the resulting alert to Telegram in size-bounded chunks
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nifty_alerts::prelude::*;
//!
//! let config = EngineConfig::default();
//! let creds = Credentials::from_env().unwrap();
//!
//! let acquirer = SnapshotAcquirer::new(
//!     Box::new(NseClient::new().unwrap()),
//!     Box::new(FileCache::new(&config.cache_dir).unwrap()),
//!     &config.symbol,
//!     config.cache_ttl_minutes,
//! );
//! let dispatcher = Dispatcher::new(
//!     Box::new(TelegramSink::from_credentials(&creds).unwrap()),
//!     &creds.chat_id,
//! );
//!
//! let engine = Engine::new(acquirer, config.mode.evaluator(&config), dispatcher);
//! println!("{:?}", engine.run_cycle());
//! ```
//!
//! ## What This Does NOT Do
//!
//! - Place or manage orders
//! - Guarantee exchange connectivity (the NSE endpoint is unofficial)
//! - Backtest or cover assets other than the configured index
//! - Price theta analytically (it is a linear proxy on last price)

pub mod alert;
pub mod config;
pub mod core;
pub mod data;
pub mod engine;
pub mod models;
pub mod signals;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        theta_approx, AlertError, AlertResult, ContractKey, ContractQuote, Greeks, OptionType,
        Snapshot,
    };

    // Configuration
    pub use crate::config::{Credentials, EngineConfig, RankingRules, ThresholdRules};

    // Data
    pub use crate::data::{
        load_rolling_averages, normalize_chain, CacheProvider, CachedBlob, ChainResponse,
        FileCache, HistoryLog, MarketDataSource, MemoryCache, NseClient, RollingAverages,
        SnapshotAcquirer,
    };

    // Models
    pub use crate::models::{delta, norm_cdf};

    // Signals
    pub use crate::signals::{
        atm_strike, Action, EvaluationMode, MarketTone, RankedEvaluator, SignalEvaluator,
        ThresholdEvaluator,
    };

    // Delivery
    pub use crate::alert::{chunk_message, AlertSink, DispatchReport, Dispatcher, TelegramSink};
    pub use crate::engine::{CycleOutcome, Engine};
}

// Re-export main types at crate root
pub use crate::core::{AlertError, AlertResult};
pub use crate::engine::{CycleOutcome, Engine};
