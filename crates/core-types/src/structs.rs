use crate::error::CoreError;
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The seven column headers of the published data block, in column order.
pub const COLUMN_HEADERS: [&str; 7] = [
    "Name",
    "Symbol",
    "Current Price (USD)",
    "Market Cap",
    "24h Volume",
    "24h Change %",
    "Last Updated",
];

/// One asset's normalized snapshot, in the fixed column order of the data block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub name: String,
    /// Always upper-case.
    pub symbol: String,
    pub price: Decimal,
    pub market_cap: Decimal,
    pub volume: Decimal,
    /// The provider omits this for some freshly listed assets.
    pub pct_change_24h: Option<Decimal>,
    pub captured_at: DateTime<Local>,
}

/// All rows produced by one fetch cycle, in provider response order.
///
/// A batch is replaced wholesale every cycle and every row carries the same
/// `captured_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    captured_at: DateTime<Local>,
    rows: Vec<Row>,
}

impl Batch {
    /// Builds a batch, rejecting rows stamped with a different capture time.
    pub fn new(captured_at: DateTime<Local>, rows: Vec<Row>) -> Result<Self, CoreError> {
        if let Some(row) = rows.iter().find(|r| r.captured_at != captured_at) {
            return Err(CoreError::MixedTimestamps {
                expected: captured_at.to_rfc3339(),
                found: row.captured_at.to_rfc3339(),
            });
        }
        Ok(Self { captured_at, rows })
    }

    pub fn empty(captured_at: DateTime<Local>) -> Self {
        Self {
            captured_at,
            rows: Vec::new(),
        }
    }

    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
