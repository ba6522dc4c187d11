//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::Config;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Three well-formed JPY transactions across two merchants and one with a malformed date.
pub const SAMPLE_JSON: &str = r#"[
  {"merchantId": "m1", "clientId": "c1", "transactionDate": "2024-01-05", "salesAmount": 100, "feeAmount": 5, "currency": "JPY"},
  {"merchantId": "m1", "clientId": "c2", "transactionDate": "2024-01-20", "salesAmount": 200, "feeAmount": 10, "currency": "JPY"},
  {"merchantId": "m2", "clientId": "c1", "transactionDate": "2024-02-01", "salesAmount": 50, "feeAmount": 2, "currency": "JPY"},
  {"merchantId": "m1", "clientId": "c1", "transactionDate": "not-a-date", "salesAmount": 999, "feeAmount": 99, "currency": "JPY"}
]"#;

/// The same rows as `SAMPLE_JSON` in CSV form.
pub const SAMPLE_CSV: &str = "\
merchantId,clientId,transactionDate,salesAmount,feeAmount,currency
m1,c1,2024-01-05,100,5,JPY
m1,c2,2024-01-20,200,10,JPY
m2,c1,2024-02-01,50,2,JPY
m1,c1,not-a-date,999,99,JPY
";

/// Writes `SAMPLE_JSON` to `dir/sample.json` and returns its path.
pub fn write_sample_json(dir: &Path) -> PathBuf {
    let path = dir.join("sample.json");
    std::fs::write(&path, SAMPLE_JSON).unwrap();
    path
}

/// Test environment that sets up a sales home directory with a Config and the sample data.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment from the JSON sample.
    pub async fn new() -> Self {
        Self::with_data("sample.json", SAMPLE_JSON).await
    }

    /// Creates a test environment from the CSV sample.
    pub async fn new_csv() -> Self {
        Self::with_data("sample.csv", SAMPLE_CSV).await
    }

    /// Creates a test environment whose transactions file is `file_name` holding `content`.
    pub async fn with_data(file_name: &str, content: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join(file_name);
        std::fs::write(&source, content).unwrap();
        let root = temp_dir.path().join("sales");
        let config = Config::create(&root, &source).await.unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }
}
