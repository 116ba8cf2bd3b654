use crate::api::{CellValue, GridRegion, SheetsApi, a1_range, column_letters};
use crate::error::SheetsError;
use analytics::{AnalysisReport, MAX_DISPLAY_LINES};
use configuration::SheetsConfig;
use core_types::{Batch, COLUMN_HEADERS, Row};
use std::sync::Arc;

/// Text of the title cell, A1.
pub const TRACKER_TITLE: &str = "Cryptocurrency Live Data Tracker";
/// Zero-based index of the header row (row 3 in the sheet).
pub const HEADER_ROW_INDEX: u32 = 2;
/// One-based sheet row where the first data row is written.
pub const DATA_FIRST_ROW: usize = 4;
/// Zero-based column of the analysis block (column I), one gap column right of the data.
pub const ANALYSIS_COLUMN_INDEX: u32 = 8;
/// Timestamp format of the "Last Updated" column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The fixed coordinates of everything the tracker writes.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub sheet_name: String,
    pub sheet_id: i64,
    /// Rows reserved for the data block. Each publish overwrites all of them.
    pub data_capacity: usize,
}

impl SheetLayout {
    pub fn new(config: &SheetsConfig, data_capacity: usize) -> Self {
        Self {
            sheet_name: config.sheet_name.clone(),
            sheet_id: config.sheet_id,
            data_capacity,
        }
    }

    fn last_column(&self) -> String {
        column_letters(COLUMN_HEADERS.len() as u32 - 1)
    }

    pub fn whole_sheet(&self) -> String {
        a1_range(&self.sheet_name, "")
    }

    pub fn header_block(&self) -> String {
        a1_range(&self.sheet_name, &format!("A1:{}{}", self.last_column(), HEADER_ROW_INDEX + 1))
    }

    pub fn data_block(&self) -> String {
        let last_row = DATA_FIRST_ROW + self.data_capacity.max(1) - 1;
        a1_range(
            &self.sheet_name,
            &format!("A{DATA_FIRST_ROW}:{}{last_row}", self.last_column()),
        )
    }

    pub fn analysis_block(&self) -> String {
        let column = column_letters(ANALYSIS_COLUMN_INDEX);
        a1_range(&self.sheet_name, &format!("{column}1:{column}{MAX_DISPLAY_LINES}"))
    }

    pub fn header_region(&self) -> GridRegion {
        GridRegion {
            sheet_id: self.sheet_id,
            start_row_index: HEADER_ROW_INDEX,
            end_row_index: HEADER_ROW_INDEX + 1,
            start_column_index: 0,
            end_column_index: COLUMN_HEADERS.len() as u32,
        }
    }
}

/// Writes batches and reports into the fixed layout of the target sheet.
///
/// The sheet connection is passed in and owned here; nothing is global.
pub struct SheetPublisher {
    api: Arc<dyn SheetsApi>,
    layout: SheetLayout,
}

impl SheetPublisher {
    pub fn new(api: Arc<dyn SheetsApi>, layout: SheetLayout) -> Self {
        Self { api, layout }
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    /// Resets the sheet: clears it, writes the title and header rows and
    /// bolds the header. Running it again produces the same sheet.
    pub async fn initialize(&self) -> Result<(), SheetsError> {
        self.api.clear(&self.layout.whole_sheet()).await?;

        let header_block = vec![
            vec![CellValue::text(TRACKER_TITLE)],
            Vec::new(),
            COLUMN_HEADERS.iter().map(|h| CellValue::text(*h)).collect(),
        ];
        self.api
            .update_values(&self.layout.header_block(), header_block)
            .await?;
        self.api.format_bold(self.layout.header_region()).await?;

        tracing::info!(sheet = %self.layout.sheet_name, "Sheet initialized.");
        Ok(())
    }

    /// Overwrites the whole data block; rows past the end of the batch are blanked.
    pub async fn publish_data(&self, batch: &Batch) -> Result<(), SheetsError> {
        let capacity = self.layout.data_capacity;
        if batch.len() > capacity {
            return Err(SheetsError::CapacityExceeded {
                rows: batch.len(),
                capacity,
            });
        }

        let mut values: Vec<Vec<CellValue>> = batch.iter().map(row_cells).collect();
        values.resize_with(capacity, || vec![CellValue::Empty; COLUMN_HEADERS.len()]);

        self.api
            .update_values(&self.layout.data_block(), values)
            .await
    }

    /// Overwrites the analysis block, one report line per row.
    pub async fn publish_analysis(&self, report: &AnalysisReport) -> Result<(), SheetsError> {
        let mut values: Vec<Vec<CellValue>> = report
            .display_lines()
            .into_iter()
            .map(|line| vec![CellValue::Text(line)])
            .collect();
        values.resize_with(MAX_DISPLAY_LINES, || vec![CellValue::Empty]);

        self.api
            .update_values(&self.layout.analysis_block(), values)
            .await
    }
}

/// A row's cells in the fixed column order of `COLUMN_HEADERS`.
pub fn row_cells(row: &Row) -> Vec<CellValue> {
    vec![
        CellValue::text(row.name.as_str()),
        CellValue::text(row.symbol.as_str()),
        CellValue::decimal(row.price),
        CellValue::decimal(row.market_cap),
        CellValue::decimal(row.volume),
        row.pct_change_24h
            .map(CellValue::decimal)
            .unwrap_or(CellValue::Empty),
        CellValue::Text(row.captured_at.format(TIMESTAMP_FORMAT).to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySheet;
    use analytics::StatisticsAnalyzer;
    use chrono::{Local, TimeZone};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn layout(capacity: usize) -> SheetLayout {
        SheetLayout::new(&SheetsConfig::default(), capacity)
    }

    fn publisher(capacity: usize) -> (Arc<MemorySheet>, SheetPublisher) {
        let sheet = Arc::new(MemorySheet::new());
        let publisher = SheetPublisher::new(sheet.clone(), layout(capacity));
        (sheet, publisher)
    }

    fn batch(n: usize) -> Batch {
        let captured_at = Local.with_ymd_and_hms(2025, 1, 8, 9, 30, 0).unwrap();
        let rows = (0..n)
            .map(|i| Row {
                name: format!("Coin {i}"),
                symbol: format!("C{i}"),
                price: dec!(1.5) * Decimal::from(i as i64 + 1),
                market_cap: Decimal::from(1000 - i as i64),
                volume: dec!(42),
                pct_change_24h: if i == 0 { None } else { Some(dec!(-2.5)) },
                captured_at,
            })
            .collect();
        Batch::new(captured_at, rows).unwrap()
    }

    #[test]
    fn layout_ranges_match_the_fixed_coordinates() {
        let layout = layout(50);
        assert_eq!(layout.whole_sheet(), "'Sheet1'");
        assert_eq!(layout.header_block(), "'Sheet1'!A1:G3");
        assert_eq!(layout.data_block(), "'Sheet1'!A4:G53");
        assert_eq!(layout.analysis_block(), format!("'Sheet1'!I1:I{MAX_DISPLAY_LINES}"));
        assert_eq!(
            layout.header_region(),
            GridRegion {
                sheet_id: 0,
                start_row_index: 2,
                end_row_index: 3,
                start_column_index: 0,
                end_column_index: 7,
            }
        );
    }

    #[tokio::test]
    async fn initialize_writes_title_blank_and_bold_header() {
        let (sheet, publisher) = publisher(5);
        publisher.initialize().await.unwrap();

        let snapshot = sheet.snapshot().await;
        assert_eq!(snapshot.row_text(0), [TRACKER_TITLE]);
        assert!(snapshot.row_text(1).is_empty());
        assert_eq!(snapshot.row_text(2), COLUMN_HEADERS);
        let bold: Vec<(u32, u32)> = snapshot.bold.iter().copied().collect();
        let header: Vec<(u32, u32)> = (0..7).map(|c| (HEADER_ROW_INDEX, c)).collect();
        assert_eq!(bold, header);
    }

    #[tokio::test]
    async fn initialize_twice_gives_the_same_layout() {
        let (sheet, publisher) = publisher(5);
        publisher.initialize().await.unwrap();
        let first = sheet.snapshot().await;

        publisher.publish_data(&batch(3)).await.unwrap();
        publisher.initialize().await.unwrap();

        assert_eq!(sheet.snapshot().await, first);
    }

    #[tokio::test]
    async fn data_rows_follow_column_order() {
        let (sheet, publisher) = publisher(5);
        publisher.publish_data(&batch(2)).await.unwrap();

        let snapshot = sheet.snapshot().await;
        assert_eq!(
            snapshot.row_text(3),
            ["Coin 0", "C0", "1.5", "1000", "42", "", "2025-01-08 09:30:00"]
        );
        assert_eq!(
            snapshot.row_text(4),
            ["Coin 1", "C1", "3", "999", "42", "-2.5", "2025-01-08 09:30:00"]
        );
    }

    #[tokio::test]
    async fn shorter_batch_blanks_stale_rows() {
        let (sheet, publisher) = publisher(5);
        publisher.publish_data(&batch(5)).await.unwrap();
        publisher.publish_data(&batch(2)).await.unwrap();

        let snapshot = sheet.snapshot().await;
        assert!(!snapshot.row_text(4).is_empty());
        for row in 5..9 {
            assert!(snapshot.row_text(row).is_empty(), "row {row} should be blank");
        }
    }

    #[tokio::test]
    async fn oversized_batch_is_rejected_without_writing() {
        let (sheet, publisher) = publisher(2);
        let err = publisher.publish_data(&batch(3)).await.unwrap_err();
        assert!(matches!(err, SheetsError::CapacityExceeded { rows: 3, capacity: 2 }));
        assert_eq!(sheet.write_count().await, 0);
    }

    #[tokio::test]
    async fn analysis_lines_go_down_column_i() {
        let (sheet, publisher) = publisher(5);
        let report = StatisticsAnalyzer::new().analyze(&batch(3));
        publisher.publish_analysis(&report).await.unwrap();

        let snapshot = sheet.snapshot().await;
        let lines = report.display_lines();
        for (i, line) in lines.iter().enumerate() {
            let cell = snapshot.value(i as u32, ANALYSIS_COLUMN_INDEX);
            if line.is_empty() {
                assert_eq!(cell, None);
            } else {
                assert_eq!(cell, Some(&CellValue::Text(line.clone())));
            }
        }
    }

    #[tokio::test]
    async fn no_data_report_replaces_a_previous_summary() {
        let (sheet, publisher) = publisher(5);
        publisher
            .publish_analysis(&StatisticsAnalyzer::new().analyze(&batch(3)))
            .await
            .unwrap();
        publisher.publish_analysis(&AnalysisReport::NoData).await.unwrap();

        let snapshot = sheet.snapshot().await;
        let column: Vec<_> = snapshot
            .cells
            .iter()
            .filter(|((_, c), _)| *c == ANALYSIS_COLUMN_INDEX)
            .map(|(_, v)| v.to_string())
            .collect();
        assert_eq!(column, ["Market Analysis", "No data available"]);
    }
}
