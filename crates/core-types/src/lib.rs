//! # Tracker Core Types
//!
//! The shared data model of the tracker: one normalized `Row` per asset and the
//! `Batch` that groups all rows captured in a single cycle. Every other crate in
//! the workspace speaks in these types.

pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use structs::{Batch, Row, COLUMN_HEADERS};
