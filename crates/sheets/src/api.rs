use crate::error::SheetsError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Serialize, Serializer};

/// A single cell written with `valueInputOption=RAW`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Written as an empty string so it overwrites whatever was there.
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn decimal(value: Decimal) -> Self {
        value.to_f64().map(CellValue::Number).unwrap_or(CellValue::Empty)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_str(""),
            CellValue::Text(text) => serializer.serialize_str(text),
            CellValue::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(text) => write!(f, "{text}"),
            CellValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A rectangle of cells in grid coordinates: zero-based, end-exclusive,
/// matching the Sheets `GridRange` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRegion {
    pub sheet_id: i64,
    pub start_row_index: u32,
    pub end_row_index: u32,
    pub start_column_index: u32,
    pub end_column_index: u32,
}

/// The narrow read/write contract the publisher needs from a spreadsheet service.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// Clears every value in an A1 range (a bare sheet name clears the whole tab).
    async fn clear(&self, range: &str) -> Result<(), SheetsError>;

    /// Overwrites values starting at the top-left cell of an A1 range.
    /// Values are stored as given, never evaluated as formulas.
    async fn update_values(&self, range: &str, values: Vec<Vec<CellValue>>)
    -> Result<(), SheetsError>;

    /// Makes the text in `region` bold.
    async fn format_bold(&self, region: GridRegion) -> Result<(), SheetsError>;
}

/// Zero-based column index to its A1 letters (`0` -> `A`, `26` -> `AA`).
pub fn column_letters(mut index: u32) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Qualifies a cell range with a quoted sheet name: `'Sheet1'!A4:G53`.
/// An empty `cells` refers to the whole sheet.
pub fn a1_range(sheet_name: &str, cells: &str) -> String {
    let quoted = format!("'{}'", sheet_name.replace('\'', "''"));
    if cells.is_empty() {
        quoted
    } else {
        format!("{quoted}!{cells}")
    }
}

/// Parses a single A1 cell reference (`"G53"`) into zero-based `(row, column)`.
pub fn parse_cell(cell: &str) -> Option<(u32, u32)> {
    let split = cell.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }
    let column = letters
        .bytes()
        .try_fold(0u32, |acc, b| acc.checked_mul(26)?.checked_add((b - b'A' + 1) as u32))?;
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, column - 1))
}
