//! Data fetching and storage
//!
//! Handles:
//! - NSE option-chain API (session-gated public endpoint)
//! - Local caching of the normalized chain
//! - Daily open-interest logs and rolling memory

pub mod nse;
pub mod cache;
pub mod history;

pub use nse::*;
pub use cache::*;
pub use history::*;
