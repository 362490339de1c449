use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One weekly OHLCV bar, ascending by timestamp within a series
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeeklyBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Entry in the scan universe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolListing {
    pub symbol: String,
    pub name: String,
}

/// Display metadata for a symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub name: String,
    pub sector: String,
}

/// Point-in-time health of a price source
#[derive(Debug, Clone, Serialize)]
pub struct SourceHealth {
    pub source: String,
    pub is_healthy: bool,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub success_rate: f64,
    pub last_latency_ms: u64,
}

/// Error types for market data retrieval
#[derive(Debug, thiserror::Error)]
pub enum MarketDataError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("rate limit exceeded for {provider}")]
    RateLimited {
        provider: String,
        retry_after: Option<u64>,
    },

    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    #[error("no price history for {0}")]
    NoData(String),
}

/// Result type for market data operations
pub type Result<T> = std::result::Result<T, MarketDataError>;

/// Trait for weekly price-history sources
#[async_trait::async_trait]
pub trait WeeklySource: Send + Sync {
    /// Fetch the weekly OHLCV series for a symbol, ascending by date.
    /// An empty series means the provider has no usable history.
    async fn fetch_weekly_series(
        &self,
        symbol: &str,
        lookback_years: u32,
    ) -> Result<Vec<WeeklyBar>>;

    /// Display metadata for a symbol. Falls back to an "Unknown" sector,
    /// never fails.
    fn symbol_info(&self, symbol: &str) -> SymbolInfo;

    /// Health snapshot, answered from bookkeeping rather than an API call
    async fn health(&self) -> SourceHealth;

    /// Short source identifier for logs and reports
    fn name(&self) -> &str;
}
