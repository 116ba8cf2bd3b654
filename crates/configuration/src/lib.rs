use crate::error::ConfigError;
use std::path::{Path, PathBuf};

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    LoggingConfig, LoopConfig, MarketDataConfig, SheetsConfig, TrackerConfig,
    PROVIDER_MAX_PER_PAGE,
};

/// Values given on the command line. They win over the file and the environment.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct ConfigOverrides {
    /// Path to the Google service-account credentials JSON.
    #[cfg_attr(feature = "clap", arg(long))]
    pub credentials: Option<PathBuf>,

    /// Identifier of the target spreadsheet.
    #[cfg_attr(feature = "clap", arg(long))]
    pub spreadsheet_id: Option<String>,

    /// Seconds to wait between successful updates.
    #[cfg_attr(feature = "clap", arg(long))]
    pub interval: Option<u64>,

    /// Seconds to wait before retrying a failed update.
    #[cfg_attr(feature = "clap", arg(long))]
    pub backoff: Option<u64>,

    /// Number of assets to track.
    #[cfg_attr(feature = "clap", arg(long))]
    pub top_n: Option<u32>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut TrackerConfig) {
        if let Some(path) = &self.credentials {
            config.sheets.credentials_path = Some(path.clone());
        }
        if let Some(id) = &self.spreadsheet_id {
            config.sheets.spreadsheet_id = Some(id.clone());
        }
        if let Some(secs) = self.interval {
            config.tracker.update_interval_secs = secs;
        }
        if let Some(secs) = self.backoff {
            config.tracker.retry_backoff_secs = secs;
        }
        if let Some(n) = self.top_n {
            config.market_data.top_n = n;
        }
    }
}

/// Loads the application configuration.
///
/// Sources are layered in increasing priority: built-in defaults, the TOML file
/// (`config.toml` in the working directory when no path is given, optional in that
/// case), `TRACKER__SECTION__KEY` environment variables, then the CLI overrides.
/// The merged result is validated before it is returned.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<TrackerConfig, ConfigError> {
    let file_source = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file_source)
        .add_source(
            config::Environment::with_prefix("TRACKER")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `TrackerConfig` struct
    let mut config = builder.try_deserialize::<TrackerConfig>()?;
    overrides.apply(&mut config);
    config.validate()?;

    Ok(config)
}
