//! NSE option-chain fetcher
//!
//! Fetches the index option chain from NSE's public website endpoint and
//! normalizes it into a [`Snapshot`].
//!
//! Note: this endpoint is unofficial and session/cookie gated. It is used
//! read-only, for personal research.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::core::{AlertError, AlertResult, ContractQuote, OptionType, Snapshot};

const NSE_HOME: &str = "https://www.nseindia.com";
const NSE_CHAIN_URL: &str = "https://www.nseindia.com/api/option-chain-indices";
const EXPIRY_FORMAT: &str = "%d-%b-%Y";

/// Source of raw option-chain payloads
pub trait MarketDataSource {
    /// Fetch the current chain for `symbol`
    fn fetch_chain(&self, symbol: &str) -> AlertResult<ChainResponse>;
}

/// NSE website client
pub struct NseClient {
    client: reqwest::blocking::Client,
    home_url: String,
    chain_url: String,
}

impl NseClient {
    pub fn new() -> AlertResult<Self> {
        Self::with_timeout(Duration::from_secs(5))
    }

    pub fn with_timeout(timeout: Duration) -> AlertResult<Self> {
        use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.nseindia.com/option-chain"));

        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .default_headers(headers)
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| AlertError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            home_url: NSE_HOME.to_string(),
            chain_url: NSE_CHAIN_URL.to_string(),
        })
    }
}

impl MarketDataSource for NseClient {
    fn fetch_chain(&self, symbol: &str) -> AlertResult<ChainResponse> {
        // Home page visit sets the session cookies the API expects
        if let Err(e) = self.client.get(&self.home_url).send() {
            tracing::debug!("NSE session warm-up failed: {}", e);
        }

        let response = self
            .client
            .get(&self.chain_url)
            .query(&[("symbol", symbol)])
            .send()
            .map_err(|e| AlertError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AlertError::network(format!("NSE fetch failed: HTTP {}", status.as_u16())));
        }

        response
            .json::<ChainResponse>()
            .map_err(|e| AlertError::data(format!("Failed to parse option chain: {}", e)))
    }
}

// NSE API response structures

#[derive(Debug, Clone, Deserialize)]
pub struct ChainResponse {
    pub records: ChainRecords,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainRecords {
    #[serde(rename = "underlyingValue")]
    pub underlying_value: Option<f64>,
    #[serde(default)]
    pub data: Vec<StrikeRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StrikeRecord {
    #[serde(rename = "strikePrice")]
    pub strike_price: Option<Value>,
    #[serde(rename = "CE")]
    pub call: Option<LegRecord>,
    #[serde(rename = "PE")]
    pub put: Option<LegRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LegRecord {
    #[serde(rename = "lastPrice")]
    pub last_price: Option<Value>,
    #[serde(rename = "impliedVolatility")]
    pub implied_volatility: Option<Value>,
    #[serde(rename = "openInterest")]
    pub open_interest: Option<Value>,
    #[serde(rename = "changeinOpenInterest", alias = "changeInOpenInterest")]
    pub change_in_open_interest: Option<Value>,
    #[serde(rename = "expiryDate")]
    pub expiry_date: Option<String>,
}

/// Coerce a JSON number or numeric string, anything else is missing
fn numeric(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn parse_expiry(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?.trim();
    NaiveDate::parse_from_str(raw, EXPIRY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

/// Convert one leg into a quote; `None` drops the row
fn convert_leg(
    leg: &LegRecord,
    strike: Option<f64>,
    option_type: OptionType,
    spot: f64,
) -> Option<ContractQuote> {
    let strike = strike?;
    let expiry = parse_expiry(leg.expiry_date.as_deref())?;
    let last_price = numeric(leg.last_price.as_ref())?;
    let implied_volatility = numeric(leg.implied_volatility.as_ref())?;
    let open_interest = numeric(leg.open_interest.as_ref())?;
    let change = numeric(leg.change_in_open_interest.as_ref())?;

    if strike <= 0.0 || last_price < 0.0 || open_interest < 0.0 {
        return None;
    }

    Some(ContractQuote::new(
        strike,
        option_type,
        last_price,
        implied_volatility,
        open_interest.round() as u64,
        change.round() as i64,
        expiry,
        spot,
    ))
}

/// Normalize a raw chain into a snapshot.
///
/// Rows with any unparseable required field are dropped. A payload without
/// the underlying value is malformed.
pub fn normalize_chain(symbol: &str, response: &ChainResponse) -> AlertResult<Snapshot> {
    let spot = response
        .records
        .underlying_value
        .filter(|s| s.is_finite() && *s > 0.0)
        .ok_or_else(|| AlertError::data("Option chain has no underlying value"))?;

    let mut snapshot = Snapshot::new(symbol, spot);
    let mut dropped = 0usize;

    for record in &response.records.data {
        let strike = numeric(record.strike_price.as_ref());
        let legs = [(OptionType::Call, &record.call), (OptionType::Put, &record.put)];

        for (option_type, leg) in legs {
            let Some(leg) = leg else { continue };
            match convert_leg(leg, strike, option_type, spot) {
                Some(quote) => snapshot.push(quote),
                None => dropped += 1,
            }
        }
    }

    if dropped > 0 {
        tracing::debug!("Dropped {} incomplete rows from {} chain", dropped, symbol);
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "records": {
            "underlyingValue": 18012.5,
            "data": [
                {
                    "strikePrice": 18000,
                    "expiryDate": "28-Nov-2024",
                    "CE": {"lastPrice": 21.0, "impliedVolatility": 12.5, "openInterest": 1500,
                           "changeinOpenInterest": 250, "expiryDate": "28-Nov-2024"},
                    "PE": {"lastPrice": "9.5", "impliedVolatility": 13.1, "openInterest": 900,
                           "changeInOpenInterest": -40, "expiryDate": "28-Nov-2024"}
                },
                {
                    "strikePrice": 18050,
                    "expiryDate": "28-Nov-2024",
                    "CE": {"lastPrice": "-", "impliedVolatility": 0, "openInterest": 10,
                           "changeinOpenInterest": 0, "expiryDate": "28-Nov-2024"}
                },
                {
                    "strikePrice": 18100,
                    "PE": {"lastPrice": 120.0, "impliedVolatility": 14.0, "openInterest": 30,
                           "changeinOpenInterest": 5}
                }
            ]
        }
    }"#;

    #[test]
    fn test_normalize_chain() {
        let response: ChainResponse = serde_json::from_str(SAMPLE).unwrap();
        let snapshot = normalize_chain("NIFTY", &response).unwrap();

        // CE 18050 has a non-numeric price, PE 18100 has no expiry
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.spot, 18012.5);

        let call = &snapshot.contracts[0];
        assert_eq!(call.option_type, OptionType::Call);
        assert_eq!(call.strike, 18000.0);
        assert_eq!(call.open_interest, 1500);
        assert_eq!(call.open_interest_change, 250);
        assert_eq!(call.expiry, NaiveDate::from_ymd_opt(2024, 11, 28).unwrap());
        assert!((call.theta + 30.0).abs() < 1e-9);

        let put = &snapshot.contracts[1];
        assert_eq!(put.option_type, OptionType::Put);
        assert_eq!(put.last_price, 9.5);
        assert_eq!(put.open_interest_change, -40);
        assert!(snapshot.contracts.iter().all(|q| q.underlying_spot == 18012.5));
    }

    #[test]
    fn test_all_rows_dropped_is_empty_snapshot() {
        let json = r#"{"records": {"underlyingValue": 18000.0, "data": [
            {"strikePrice": 18000, "CE": {"lastPrice": null}}
        ]}}"#;
        let response: ChainResponse = serde_json::from_str(json).unwrap();
        let snapshot = normalize_chain("NIFTY", &response).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_missing_spot_is_malformed() {
        let json = r#"{"records": {"data": []}}"#;
        let response: ChainResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(normalize_chain("NIFTY", &response), Err(AlertError::Data(_))));
    }

    #[test]
    #[ignore] // Requires network
    fn test_fetch_live_chain() {
        let client = NseClient::new().unwrap();
        let response = client.fetch_chain("NIFTY").unwrap();
        let snapshot = normalize_chain("NIFTY", &response).unwrap();

        println!("NIFTY spot: {}, contracts: {}", snapshot.spot, snapshot.len());
        assert!(snapshot.spot > 0.0);
    }
}
