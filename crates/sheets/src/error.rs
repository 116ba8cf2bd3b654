use std::path::PathBuf;
use thiserror::Error;

/// A problem with the service-account credentials. Always fatal: the tracker
/// never starts its loop without a usable key.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error(
        "Credentials file not found at: {0}. Download the service-account JSON key from \
         the Google Cloud Console and point --credentials at it."
    )]
    CredentialsNotFound(PathBuf),

    #[error("Credentials file at {path} could not be read: {source}")]
    CredentialsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Credentials file is not a valid service-account key: {0}")]
    InvalidCredentials(String),
}

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Failed to obtain an access token: {0}")]
    Auth(String),

    #[error("Sheets API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Sheets API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid Sheets API URL: {0}")]
    InvalidUrl(String),

    #[error("Batch of {rows} rows does not fit the {capacity}-row data block")]
    CapacityExceeded { rows: usize, capacity: usize },

    #[error("Invalid A1 range '{0}'")]
    InvalidRange(String),

    #[error("Simulated write failure: {0}")]
    Simulated(String),
}

impl From<url::ParseError> for SheetsError {
    fn from(e: url::ParseError) -> Self {
        SheetsError::InvalidUrl(e.to_string())
    }
}
