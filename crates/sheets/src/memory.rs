use crate::api::{CellValue, GridRegion, SheetsApi, parse_cell};
use crate::error::SheetsError;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

/// Everything a sheet shows: non-empty values and bold cells, keyed by
/// zero-based `(row, column)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetSnapshot {
    pub cells: BTreeMap<(u32, u32), CellValue>,
    pub bold: BTreeSet<(u32, u32)>,
}

impl SheetSnapshot {
    pub fn value(&self, row: u32, column: u32) -> Option<&CellValue> {
        self.cells.get(&(row, column))
    }

    /// The values of one row as display strings, up to its last non-empty cell.
    pub fn row_text(&self, row: u32) -> Vec<String> {
        let Some(last) = self.cells.range((row, 0)..=(row, u32::MAX)).map(|((_, c), _)| *c).last()
        else {
            return Vec::new();
        };
        (0..=last)
            .map(|column| self.value(row, column).map(ToString::to_string).unwrap_or_default())
            .collect()
    }

    /// A plain-text dump, one sheet row per line, cells separated by ` | `.
    pub fn render(&self) -> String {
        let Some(last_row) = self.cells.keys().map(|(r, _)| *r).max() else {
            return String::new();
        };
        (0..=last_row)
            .map(|row| self.row_text(row).join(" | "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    snapshot: SheetSnapshot,
    writes: usize,
    failures_pending: usize,
}

/// A `SheetsApi` that keeps a single tab in memory.
///
/// Backs `--dry-run` and the publisher and loop tests. Ranges must carry a cell
/// reference except for `clear`, where a bare sheet name clears everything.
#[derive(Debug, Default)]
pub struct MemorySheet {
    state: Mutex<MemoryState>,
    echo: bool,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs the rendered sheet after every value write.
    pub fn with_echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    pub async fn snapshot(&self) -> SheetSnapshot {
        self.state.lock().await.snapshot.clone()
    }

    /// Number of successful `update_values` calls so far.
    pub async fn write_count(&self) -> usize {
        self.state.lock().await.writes
    }

    /// Makes the next `n` operations of any kind fail.
    pub async fn fail_next(&self, n: usize) {
        self.state.lock().await.failures_pending = n;
    }

    fn take_failure(state: &mut MemoryState, operation: &str) -> Result<(), SheetsError> {
        if state.failures_pending > 0 {
            state.failures_pending -= 1;
            return Err(SheetsError::Simulated(format!("{operation} rejected")));
        }
        Ok(())
    }
}

/// Splits `'Sheet1'!A4:G53` into its cell part, `A4:G53`. `None` for a bare sheet name.
fn cell_part(range: &str) -> Option<&str> {
    range.rsplit_once('!').map(|(_, cells)| cells)
}

/// Zero-based inclusive bounds of `A4:G53`, or of the single cell `A4`.
fn bounds(cells: &str, range: &str) -> Result<((u32, u32), (u32, u32)), SheetsError> {
    let invalid = || SheetsError::InvalidRange(range.to_string());
    let (start, end) = cells.split_once(':').unwrap_or((cells, cells));
    let start = parse_cell(start).ok_or_else(invalid)?;
    let end = parse_cell(end).ok_or_else(invalid)?;
    Ok((start, end))
}

#[async_trait]
impl SheetsApi for MemorySheet {
    async fn clear(&self, range: &str) -> Result<(), SheetsError> {
        let mut state = self.state.lock().await;
        Self::take_failure(&mut state, "clear")?;

        match cell_part(range) {
            None => state.snapshot.cells.clear(),
            Some(cells) => {
                let ((top, left), (bottom, right)) = bounds(cells, range)?;
                state
                    .snapshot
                    .cells
                    .retain(|(r, c), _| !(top..=bottom).contains(r) || !(left..=right).contains(c));
            }
        }
        Ok(())
    }

    async fn update_values(
        &self,
        range: &str,
        values: Vec<Vec<CellValue>>,
    ) -> Result<(), SheetsError> {
        let mut state = self.state.lock().await;
        Self::take_failure(&mut state, "update")?;

        let cells = cell_part(range).ok_or_else(|| SheetsError::InvalidRange(range.to_string()))?;
        let ((top, left), _) = bounds(cells, range)?;

        for (dr, row) in values.into_iter().enumerate() {
            for (dc, value) in row.into_iter().enumerate() {
                let key = (top + dr as u32, left + dc as u32);
                if value.is_empty() {
                    state.snapshot.cells.remove(&key);
                } else {
                    state.snapshot.cells.insert(key, value);
                }
            }
        }
        state.writes += 1;

        if self.echo {
            tracing::info!(range, "Dry-run write:\n{}", state.snapshot.render());
        }
        Ok(())
    }

    async fn format_bold(&self, region: GridRegion) -> Result<(), SheetsError> {
        let mut state = self.state.lock().await;
        Self::take_failure(&mut state, "format")?;

        for row in region.start_row_index..region.end_row_index {
            for column in region.start_column_index..region.end_column_index {
                state.snapshot.bold.insert((row, column));
            }
        }
        Ok(())
    }
}
