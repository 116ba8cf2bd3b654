//! # Tracker Sheets
//!
//! Publishes each cycle's batch and analysis into a fixed layout on a spreadsheet.
//!
//! ## Architectural Principles
//!
//! - **One narrow seam:** everything above this crate talks to `SheetsApi`, which
//!   offers only clear, write-values and bold. `GoogleSheetsClient` implements it
//!   against the Sheets v4 REST API; `MemorySheet` implements it in memory for
//!   dry runs and tests.
//! - **Fixed coordinates:** `SheetLayout` owns every range the tracker writes, so
//!   stale rows are always overwritten rather than appended below.
//!
//! ## Public API
//!
//! - `SheetPublisher`: `initialize`, `publish_data` and `publish_analysis`.
//! - `GoogleSheetsClient` / `ServiceAccountAuth`: the live backend and its token cache.
//! - `MemorySheet`: the in-memory backend.

pub mod api;
pub mod auth;
pub mod error;
pub mod google;
pub mod memory;
pub mod publisher;

pub use api::{CellValue, GridRegion, SheetsApi};
pub use auth::{ServiceAccountAuth, ServiceAccountKey};
pub use error::{SetupError, SheetsError};
pub use google::GoogleSheetsClient;
pub use memory::{MemorySheet, SheetSnapshot};
pub use publisher::{SheetLayout, SheetPublisher, TRACKER_TITLE};
