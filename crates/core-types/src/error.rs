use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    #[error("Batch rows must share one capture timestamp: expected {expected}, found {found}")]
    MixedTimestamps { expected: String, found: String },
}
