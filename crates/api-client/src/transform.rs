use crate::error::TransformError;
use crate::responses::RawRecord;
use chrono::{DateTime, Local};
use core_types::{Batch, Row};

/// Source of the capture timestamp. Swappable so tests can pin time.
pub type Clock = fn() -> DateTime<Local>;

/// Normalizes one provider record into a `Row` stamped with `captured_at`.
///
/// Missing identity or money fields are an error, never silently defaulted.
pub fn transform(record: &RawRecord, captured_at: DateTime<Local>) -> Result<Row, TransformError> {
    Ok(Row {
        name: required(record, "name", record.name.clone())?,
        symbol: required(record, "symbol", record.symbol.as_deref().map(str::to_uppercase))?,
        price: required(record, "current_price", record.current_price)?,
        market_cap: required(record, "market_cap", record.market_cap)?,
        volume: required(record, "total_volume", record.total_volume)?,
        pct_change_24h: record.price_change_percentage_24h,
        captured_at,
    })
}

fn required<T>(record: &RawRecord, field: &'static str, value: Option<T>) -> Result<T, TransformError> {
    value.ok_or_else(|| TransformError::MissingField {
        id: record.id.clone(),
        field,
    })
}

/// Turns a whole fetch result into a `Batch`.
#[derive(Debug, Clone, Copy)]
pub struct RecordTransformer {
    clock: Clock,
}

impl Default for RecordTransformer {
    fn default() -> Self {
        Self { clock: Local::now }
    }
}

impl RecordTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self { clock }
    }

    /// Reads the clock once, then stamps every row with that same instant.
    /// The first malformed record fails the whole batch.
    pub fn transform_batch(&self, records: &[RawRecord]) -> Result<Batch, TransformError> {
        let captured_at = (self.clock)();
        let rows = records
            .iter()
            .map(|record| transform(record, captured_at))
            .collect::<Result<Vec<Row>, TransformError>>()?;

        tracing::debug!(rows = rows.len(), %captured_at, "Transformed market records.");
        Ok(Batch::new(captured_at, rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn record(id: &str, symbol: &str, market_cap: Option<Decimal>) -> RawRecord {
        RawRecord {
            id: id.to_string(),
            name: Some(id.to_string()),
            symbol: Some(symbol.to_string()),
            current_price: Some(dec!(100.5)),
            market_cap,
            total_volume: Some(dec!(2000)),
            price_change_percentage_24h: Some(dec!(-1.25)),
        }
    }

    static TICKS: AtomicI64 = AtomicI64::new(0);

    // Every call returns a later instant, so a per-row stamp would be visible.
    fn ticking_clock() -> DateTime<Local> {
        let tick = TICKS.fetch_add(1, Ordering::SeqCst);
        Local.timestamp_opt(1_700_000_000 + tick, 0).unwrap()
    }

    #[test]
    fn symbol_is_upper_cased() {
        let row = transform(&record("bitcoin", "btc", Some(dec!(1))), Local::now()).unwrap();
        assert_eq!(row.symbol, "BTC");
        assert_eq!(row.name, "bitcoin");
        assert_eq!(row.price, dec!(100.5));
        assert_eq!(row.pct_change_24h, Some(dec!(-1.25)));
    }

    #[test]
    fn missing_market_cap_is_an_error() {
        let err = transform(&record("ghost", "gst", None), Local::now()).unwrap_err();
        assert_eq!(
            err,
            TransformError::MissingField {
                id: "ghost".to_string(),
                field: "market_cap",
            }
        );
    }

    #[test]
    fn missing_change_is_carried_as_none() {
        let mut raw = record("new-coin", "new", Some(dec!(1)));
        raw.price_change_percentage_24h = None;
        let row = transform(&raw, Local::now()).unwrap();
        assert_eq!(row.pct_change_24h, None);
    }

    #[test]
    fn batch_shares_one_capture_timestamp() {
        let records: Vec<RawRecord> = (0..20)
            .map(|i| record(&format!("coin-{i}"), &format!("c{i}"), Some(Decimal::from(i))))
            .collect();

        let batch = RecordTransformer::with_clock(ticking_clock)
            .transform_batch(&records)
            .unwrap();

        assert_eq!(batch.len(), records.len());
        assert!(batch.iter().all(|r| r.captured_at == batch.captured_at()));
        assert!(batch.iter().all(|r| r.symbol == r.symbol.to_uppercase()));
        let ids: Vec<_> = batch.iter().map(|r| r.name.clone()).collect();
        let expected: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn one_bad_record_fails_the_batch() {
        let records = vec![
            record("bitcoin", "btc", Some(dec!(10))),
            record("broken", "brk", None),
        ];
        let result = RecordTransformer::new().transform_batch(&records);
        assert!(matches!(result, Err(TransformError::MissingField { .. })));
    }

    #[test]
    fn empty_input_yields_empty_batch() {
        let batch = RecordTransformer::new().transform_batch(&[]).unwrap();
        assert!(batch.is_empty());
    }
}
