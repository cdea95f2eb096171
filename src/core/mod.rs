//! Core data types for the alert engine
//!
//! Defines fundamental types:
//! - OptionType / ContractKey: contract identity
//! - ContractQuote / Snapshot: normalized chain data
//! - Greeks: per-contract delta and theta proxy
//! - AlertError: crate-wide error type

pub mod option;
pub mod quote;
pub mod greeks;
pub mod error;

pub use option::*;
pub use quote::*;
pub use greeks::*;
pub use error::*;
