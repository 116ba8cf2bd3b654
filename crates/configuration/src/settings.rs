use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The largest page the CoinGecko `coins/markets` endpoint will serve.
pub const PROVIDER_MAX_PER_PAGE: u32 = 250;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub market_data: MarketDataConfig,
    pub sheets: SheetsConfig,
    pub tracker: LoopConfig,
    pub logging: LoggingConfig,
}

/// Where and how the market snapshot is fetched.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    /// Root of the provider's REST API, without a trailing slash.
    pub base_url: String,
    /// How many assets to request per cycle (the page size).
    pub top_n: u32,
    pub request_timeout_secs: u64,
}

/// The target spreadsheet and the credentials used to write to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub spreadsheet_id: Option<String>,
    /// Path to the service-account JSON key.
    pub credentials_path: Option<PathBuf>,
    /// The tab name used in A1 ranges (e.g. `Sheet1!A4`).
    pub sheet_name: String,
    /// The numeric grid id of that tab, needed for formatting requests.
    pub sheet_id: i64,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

/// Cadence of the update loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Sleep between two successful cycles.
    pub update_interval_secs: u64,
    /// Shorter sleep after a failed cycle before retrying it.
    pub retry_backoff_secs: u64,
}

/// Log level and optional rolling file output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file here.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            top_n: 50,
            request_timeout_secs: 30,
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            credentials_path: None,
            sheet_name: "Sheet1".to_string(),
            sheet_id: 0,
            api_base_url: "https://sheets.googleapis.com/v4".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: 300,
            retry_backoff_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "tracker.log".to_string(),
        }
    }
}

impl LoopConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }
}

impl SheetsConfig {
    /// Returns the credential path and spreadsheet id, both of which are
    /// required before anything can be written to a real spreadsheet.
    pub fn target(&self) -> Result<(&Path, &str), ConfigError> {
        let credentials = self.credentials_path.as_deref().ok_or_else(|| {
            ConfigError::ValidationError(
                "a service-account credentials path is required (--credentials)".to_string(),
            )
        })?;
        let spreadsheet_id = self
            .spreadsheet_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::ValidationError(
                    "a target spreadsheet id is required (--spreadsheet-id)".to_string(),
                )
            })?;
        Ok((credentials, spreadsheet_id))
    }
}

impl TrackerConfig {
    /// Checks the values that do not depend on which sheet backend is used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let top_n = self.market_data.top_n;
        if top_n == 0 || top_n > PROVIDER_MAX_PER_PAGE {
            return Err(ConfigError::ValidationError(format!(
                "market_data.top_n must be between 1 and {PROVIDER_MAX_PER_PAGE}, got {top_n}"
            )));
        }
        if self.tracker.update_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "tracker.update_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.tracker.retry_backoff_secs == 0 {
            return Err(ConfigError::ValidationError(
                "tracker.retry_backoff_secs must be greater than zero".to_string(),
            ));
        }
        if self.sheets.sheet_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "sheets.sheet_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_cadence() {
        let config = TrackerConfig::default();
        assert_eq!(config.tracker.update_interval(), Duration::from_secs(300));
        assert_eq!(config.tracker.retry_backoff(), Duration::from_secs(10));
        assert_eq!(config.market_data.top_n, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = TrackerConfig::default();
        config.tracker.update_interval_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn page_size_above_provider_max_is_rejected() {
        let mut config = TrackerConfig::default();
        config.market_data.top_n = PROVIDER_MAX_PER_PAGE + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn target_requires_a_spreadsheet_id() {
        let mut sheets = SheetsConfig::default();
        sheets.credentials_path = Some(PathBuf::from("credentials.json"));
        assert!(sheets.target().is_err());

        sheets.spreadsheet_id = Some("   ".to_string());
        assert!(sheets.target().is_err());

        sheets.spreadsheet_id = Some("abc123".to_string());
        let (path, id) = sheets.target().unwrap();
        assert_eq!(path, Path::new("credentials.json"));
        assert_eq!(id, "abc123");
    }
}
