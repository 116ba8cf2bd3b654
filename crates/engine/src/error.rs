use api_client::{ApiError, TransformError};
use configuration::error::ConfigError;
use sheets::SheetsError;
use thiserror::Error;

/// A failure contained within one cycle. The loop logs it, backs off and
/// tries again from the fetch; it never stops the tracker.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("Failed to fetch market data: {0}")]
    Fetch(#[from] ApiError),

    #[error("Failed to transform market data: {0}")]
    Transform(#[from] TransformError),

    #[error("Failed to publish to the sheet: {0}")]
    Publish(#[from] SheetsError),
}

/// A failure that prevents the tracker from running at all.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Failed to set up the market data client: {0}")]
    MarketData(#[from] ApiError),

    #[error("Failed to set up the sheet connection: {0}")]
    Setup(#[source] SheetsError),

    #[error("Failed to initialize the sheet: {0}")]
    Initialization(#[source] SheetsError),
}
