//! # Tracker Analytics
//!
//! Descriptive statistics over one cycle's `Batch`.
//!
//! ## Architectural Principles
//!
//! - **Pure logic crate:** no I/O and no knowledge of external systems. It depends
//!   only on `core-types`.
//! - **Stateless calculation:** `StatisticsAnalyzer` takes a batch and produces an
//!   `AnalysisReport`; nothing survives between cycles.
//!
//! ## Public API
//!
//! - `StatisticsAnalyzer`: ranks, aggregates and picks the 24h-change extremes.
//! - `AnalysisReport`: the summary, or the `NoData` sentinel for an empty batch.
//! - `stats`: the underlying sum/mean/std-dev/top-k helpers.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod report;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{StatisticsAnalyzer, TOP_K};
pub use report::{AnalysisReport, ChangeExtreme, MarketSummary, RankedAsset, MAX_DISPLAY_LINES};
