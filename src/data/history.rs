//! Historical open-interest memory
//!
//! Daily call-side open-interest logs (`<YYYY-MM-DD>_ce.csv`, columns
//! `Type,Strike,OI`) and the rolling average built from the most recent ones.
//! The logs are produced elsewhere; this module only reads them.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::{AlertResult, ContractKey, OptionType};

/// Suffix identifying call-side daily logs
pub const LOG_SUFFIX: &str = "_ce.csv";

/// Minimum observations for a key to be averaged
const MIN_OBSERVATIONS: usize = 2;

/// Mean open interest per contract over recent sessions
pub type RollingAverages = HashMap<ContractKey, f64>;

/// One row of a daily log
#[derive(Debug, Clone, Deserialize)]
struct HistoryRow {
    #[serde(rename = "Type")]
    option_type: String,
    #[serde(rename = "Strike")]
    strike: f64,
    #[serde(rename = "OI")]
    open_interest: f64,
}

/// Directory of daily open-interest logs
pub struct HistoryLog {
    dir: PathBuf,
    depth: usize,
}

impl HistoryLog {
    pub fn new(dir: impl Into<PathBuf>, depth: usize) -> Self {
        Self {
            dir: dir.into(),
            depth,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Rolling averages over the last `depth` logs. Never fails.
    pub fn rolling_averages(&self) -> RollingAverages {
        match self.try_rolling_averages() {
            Ok(averages) => averages,
            Err(e) => {
                tracing::warn!("Rolling OI load failed: {}", e);
                RollingAverages::new()
            }
        }
    }

    fn try_rolling_averages(&self) -> AlertResult<RollingAverages> {
        let mut memory: HashMap<ContractKey, Vec<f64>> = HashMap::new();

        for path in self.recent_logs()? {
            let mut reader = csv::Reader::from_path(&path)?;
            for row in reader.deserialize::<HistoryRow>() {
                let row = row?;
                let option_type: OptionType = row.option_type.parse()?;
                memory
                    .entry(ContractKey::new(option_type, row.strike))
                    .or_default()
                    .push(row.open_interest);
            }
        }

        Ok(memory
            .into_iter()
            .filter(|(_, values)| values.len() >= MIN_OBSERVATIONS)
            .map(|(key, values)| {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                (key, mean)
            })
            .collect())
    }

    /// Most recent `depth` log files, ordered by name
    fn recent_logs(&self) -> AlertResult<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name.ends_with(LOG_SUFFIX) {
                files.push(entry.path());
            }
        }

        files.sort();
        let skip = files.len().saturating_sub(self.depth);
        Ok(files.into_iter().skip(skip).collect())
    }
}

/// Rolling averages over the last three logs in `history_dir`
pub fn load_rolling_averages(history_dir: impl AsRef<Path>) -> RollingAverages {
    HistoryLog::new(history_dir.as_ref(), 3).rolling_averages()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_log(dir: &Path, name: &str, rows: &[(&str, f64, f64)]) {
        let mut body = String::from("Type,Strike,OI\n");
        for (t, strike, oi) in rows {
            body.push_str(&format!("{},{},{}\n", t, strike, oi));
        }
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_rolling_average_over_three_logs() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        write_log(dir, "2024-11-18_ce.csv", &[("CE", 18000.0, 100.0), ("CE", 18100.0, 7.0)]);
        write_log(dir, "2024-11-19_ce.csv", &[("CE", 18000.0, 200.0)]);
        write_log(dir, "2024-11-20_ce.csv", &[("CE", 18000.0, 300.0), ("CE", 18200.0, 50.0)]);

        let averages = load_rolling_averages(dir);

        let key = ContractKey::new(OptionType::Call, 18000.0);
        assert_eq!(key.to_string(), "CE_18000");
        assert!((averages[&key] - 200.0).abs() < 1e-9);
        assert!(!averages.contains_key(&ContractKey::new(OptionType::Call, 18100.0)));
        assert!(!averages.contains_key(&ContractKey::new(OptionType::Call, 18200.0)));
        assert_eq!(averages.len(), 1);
    }

    #[test]
    fn test_only_most_recent_logs_count() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        write_log(dir, "2024-11-15_ce.csv", &[("CE", 18000.0, 10_000.0)]);
        write_log(dir, "2024-11-18_ce.csv", &[("CE", 18000.0, 100.0)]);
        write_log(dir, "2024-11-19_ce.csv", &[("CE", 18000.0, 200.0)]);
        write_log(dir, "2024-11-20_ce.csv", &[("CE", 18000.0, 300.0)]);
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let averages = load_rolling_averages(dir);
        let key = ContractKey::new(OptionType::Call, 18000.0);
        assert!((averages[&key] - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_failures_degrade_to_empty() {
        let temp_dir = tempdir().unwrap();
        assert!(load_rolling_averages(temp_dir.path().join("missing")).is_empty());

        fs::write(temp_dir.path().join("2024-11-20_ce.csv"), "Type,Strike,OI\nCE,abc,1\n").unwrap();
        assert!(load_rolling_averages(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_reading_leaves_logs_untouched() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        write_log(dir, "2024-11-19_ce.csv", &[("CE", 18000.0, 123_456.0)]);
        write_log(dir, "2024-11-20_ce.csv", &[("CE", 18000.0, 98_765.0)]);
        let before = fs::read_to_string(dir.join("2024-11-20_ce.csv")).unwrap();

        let log = HistoryLog::new(dir, 3);
        assert_eq!(log.rolling_averages().len(), 1);

        let after = fs::read_to_string(dir.join("2024-11-20_ce.csv")).unwrap();
        assert_eq!(before, after);
        assert_eq!(fs::read_dir(dir).unwrap().count(), 2);
    }
}
