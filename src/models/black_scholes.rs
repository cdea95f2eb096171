//! Black-Scholes Model
//!
//! Provides the standard normal CDF, the d1 term and option delta.
//!
//! Delta never fails: degenerate inputs (zero or negative vol, strike,
//! spot or time, or any non-finite intermediate) yield a neutral `0.0`.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::core::OptionType;

/// Standard normal CDF. NaN if the distribution cannot be built.
pub fn norm_cdf(x: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.cdf(x),
        Err(_) => f64::NAN,
    }
}

/// Black-Scholes d1 parameter (no dividend yield)
pub fn d1(spot: f64, strike: f64, time: f64, rate: f64, vol: f64) -> f64 {
    ((spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / (vol * time.sqrt())
}

/// Black-Scholes delta.
///
/// Call: `N(d1)`, put: `-N(-d1)`. Returns `0.0` for degenerate inputs.
pub fn delta(
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    vol: f64,
    option_type: OptionType,
) -> f64 {
    if !(spot > 0.0 && strike > 0.0 && time > 0.0 && vol > 0.0) || !rate.is_finite() {
        return 0.0;
    }

    let d1 = d1(spot, strike, time, rate, vol);
    if !d1.is_finite() {
        return 0.0;
    }

    let delta = match option_type {
        OptionType::Call => norm_cdf(d1),
        OptionType::Put => -norm_cdf(-d1),
    };

    if delta.is_finite() {
        delta
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_cdf() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((norm_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!(norm_cdf(-10.0) < 1e-10);
    }

    #[test]
    fn test_put_call_delta_parity() {
        let cases = [
            (18000.0, 18000.0, 3.0 / 365.0, 0.06, 0.15),
            (18000.0, 17500.0, 3.0 / 365.0, 0.06, 0.12),
            (18000.0, 18600.0, 30.0 / 365.0, 0.05, 0.25),
            (100.0, 100.0, 1.0, 0.05, 0.20),
        ];

        for (spot, strike, time, rate, vol) in cases {
            let call = delta(spot, strike, time, rate, vol, OptionType::Call);
            let put = delta(spot, strike, time, rate, vol, OptionType::Put);
            assert!((call - put - 1.0).abs() < 1e-9, "parity broken for K={}", strike);
            assert!((0.0..=1.0).contains(&call));
            assert!((-1.0..=0.0).contains(&put));
        }
    }

    #[test]
    fn test_delta_fallbacks() {
        assert_eq!(delta(18000.0, 18000.0, 0.01, 0.06, 0.0, OptionType::Call), 0.0);
        assert_eq!(delta(18000.0, 0.0, 0.01, 0.06, 0.15, OptionType::Put), 0.0);
        assert_eq!(delta(18000.0, 18000.0, 0.0, 0.06, 0.15, OptionType::Call), 0.0);
        assert_eq!(delta(18000.0, 18000.0, 0.01, 0.06, -0.2, OptionType::Call), 0.0);
        assert_eq!(delta(f64::NAN, 18000.0, 0.01, 0.06, 0.15, OptionType::Call), 0.0);
    }

    #[test]
    fn test_deep_itm_call() {
        let d = delta(18000.0, 16000.0, 3.0 / 365.0, 0.06, 0.15, OptionType::Call);
        assert!(d > 0.99);
        let p = delta(18000.0, 20000.0, 3.0 / 365.0, 0.06, 0.15, OptionType::Put);
        assert!(p < -0.99);
    }
}
