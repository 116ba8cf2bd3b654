use rust_decimal::Decimal;
use serde::Deserialize;

/// A single asset from `GET /coins/markets`.
///
/// The provider returns `null` for some numeric fields (new listings, delisted
/// markets), so they are optional here and checked during transformation.
/// There are more fields, but these are the ones the tracker publishes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub current_price: Option<Decimal>,
    pub market_cap: Option<Decimal>,
    pub total_volume: Option<Decimal>,
    pub price_change_percentage_24h: Option<Decimal>,
}

/// Represents an error body from the CoinGecko API, e.g. when rate limited.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub status: ApiErrorStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorStatus {
    pub error_code: i32,
    pub error_message: String,
}
