use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Title line at the top of the analysis block.
pub const REPORT_TITLE: &str = "Market Analysis";

/// The largest number of lines `display_lines` can produce. The sheet block is
/// sized from this so a shorter report always overwrites a longer one.
pub const MAX_DISPLAY_LINES: usize = 11 + crate::engine::TOP_K;

/// The summary of one batch, or the sentinel for a batch with no rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AnalysisReport {
    NoData,
    Summary(MarketSummary),
}

/// Aggregates over a non-empty batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    /// Largest market caps first; at most `TOP_K` entries.
    pub top_by_market_cap: Vec<RankedAsset>,
    pub total_market_cap: Decimal,
    pub average_market_cap: Decimal,
    pub average_price: Decimal,
    pub average_volume: Decimal,
    /// Sample standard deviation of the 24h change. `None` with fewer than two values.
    pub volatility_index: Option<Decimal>,
    pub highest_change: Option<ChangeExtreme>,
    pub lowest_change: Option<ChangeExtreme>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedAsset {
    pub name: String,
    pub market_cap: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeExtreme {
    pub name: String,
    pub pct_change_24h: Decimal,
}

impl AnalysisReport {
    /// Renders the report as the ordered lines of the analysis block.
    ///
    /// The order maps one-to-one onto rows of the published sheet: title, the
    /// top-N header and entries, a blank line, the aggregates, a blank line, then
    /// the highest and lowest 24h change.
    pub fn display_lines(&self) -> Vec<String> {
        let summary = match self {
            AnalysisReport::NoData => {
                return vec![REPORT_TITLE.to_string(), "No data available".to_string()];
            }
            AnalysisReport::Summary(summary) => summary,
        };

        let mut lines = vec![
            REPORT_TITLE.to_string(),
            format!("Top {} by Market Cap:", summary.top_by_market_cap.len()),
        ];
        lines.extend(
            summary
                .top_by_market_cap
                .iter()
                .map(|asset| format!("{}: {}", asset.name, format_usd(asset.market_cap))),
        );

        lines.push(String::new());
        lines.push(format!("Total Market Cap: {}", format_usd(summary.total_market_cap)));
        lines.push(format!("Average Market Cap: {}", format_usd(summary.average_market_cap)));
        lines.push(format!("Average Price: {}", format_usd(summary.average_price)));
        lines.push(format!("Average 24h Volume: {}", format_usd(summary.average_volume)));
        lines.push(format!(
            "Market Volatility Index: {}",
            summary
                .volatility_index
                .map(format_pct)
                .unwrap_or_else(|| "N/A".to_string())
        ));

        lines.push(String::new());
        lines.push(format!("Highest 24h Change: {}", format_extreme(&summary.highest_change)));
        lines.push(format!("Lowest 24h Change: {}", format_extreme(&summary.lowest_change)));
        lines
    }
}

fn format_extreme(extreme: &Option<ChangeExtreme>) -> String {
    match extreme {
        Some(e) => format!("{} ({})", e.name, format_pct(e.pct_change_24h)),
        None => "N/A".to_string(),
    }
}

/// `-3.14159` -> `-3.14%`
pub fn format_pct(value: Decimal) -> String {
    format!("{:.2}%", round_cents(value))
}

/// `1234567.891` -> `$1,234,567.89`
pub fn format_usd(value: Decimal) -> String {
    let fixed = format!("{:.2}", round_cents(value));
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, cents) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{cents}")
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
