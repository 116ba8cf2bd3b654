use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to build or send the HTTP request: {0}")]
    RequestBuild(#[from] reqwest::Error),

    #[error("The API request returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),
}

/// A provider record that cannot be normalized into a `Row`.
#[derive(Error, Debug, PartialEq)]
pub enum TransformError {
    #[error("Record '{id}' is missing required field '{field}'")]
    MissingField { id: String, field: &'static str },

    #[error("Failed to assemble batch: {0}")]
    Batch(#[from] CoreError),
}
