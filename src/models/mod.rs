//! Pricing Models
//!
//! Implements:
//! - Black-Scholes (normal CDF, d1, delta with neutral fallback)

pub mod black_scholes;

pub use black_scholes::*;
