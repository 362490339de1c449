//! Market data retrieval for the weekly screener
//!
//! Static scan universe, weekly OHLCV bar types, and the Yahoo chart
//! source behind the `WeeklySource` trait.

pub mod types;
pub mod universe;
pub mod yahoo;

pub use types::{
    MarketDataError, Result, SourceHealth, SymbolInfo, SymbolListing, WeeklyBar, WeeklySource,
};
pub use yahoo::YahooChartClient;
