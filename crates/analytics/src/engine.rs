use crate::report::{AnalysisReport, ChangeExtreme, MarketSummary, RankedAsset};
use crate::stats;
use core_types::{Batch, Row};
use rust_decimal::Decimal;

/// How many assets the market cap ranking lists.
pub const TOP_K: usize = 5;

/// A stateless calculator for deriving market statistics from one batch.
#[derive(Debug, Default)]
pub struct StatisticsAnalyzer {}

impl StatisticsAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating the market summary.
    ///
    /// Pure: the batch is only read, and re-ranking happens on a separate list of
    /// references, so the batch keeps its provider order.
    pub fn analyze(&self, batch: &Batch) -> AnalysisReport {
        let rows = batch.rows();
        if rows.is_empty() {
            return AnalysisReport::NoData;
        }

        let market_caps: Vec<Decimal> = rows.iter().map(|r| r.market_cap).collect();
        let prices: Vec<Decimal> = rows.iter().map(|r| r.price).collect();
        let volumes: Vec<Decimal> = rows.iter().map(|r| r.volume).collect();
        let changes: Vec<Decimal> = rows.iter().filter_map(|r| r.pct_change_24h).collect();

        let top_by_market_cap = stats::top_k_by(rows, TOP_K, |r| r.market_cap)
            .into_iter()
            .map(|r| RankedAsset {
                name: r.name.clone(),
                market_cap: r.market_cap,
            })
            .collect();

        let summary = MarketSummary {
            top_by_market_cap,
            total_market_cap: stats::sum(&market_caps),
            // The batch is non-empty, so every mean exists.
            average_market_cap: stats::mean(&market_caps).unwrap_or_default(),
            average_price: stats::mean(&prices).unwrap_or_default(),
            average_volume: stats::mean(&volumes).unwrap_or_default(),
            volatility_index: stats::sample_std_dev(&changes),
            highest_change: stats::arg_max_by(rows, |r| r.pct_change_24h).and_then(extreme),
            lowest_change: stats::arg_min_by(rows, |r| r.pct_change_24h).and_then(extreme),
        };

        tracing::debug!(
            rows = rows.len(),
            change_values = changes.len(),
            "Computed market summary."
        );
        AnalysisReport::Summary(summary)
    }
}

fn extreme(row: &Row) -> Option<ChangeExtreme> {
    row.pct_change_24h.map(|pct_change_24h| ChangeExtreme {
        name: row.name.clone(),
        pct_change_24h,
    })
}
