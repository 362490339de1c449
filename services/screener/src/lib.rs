//! Weekly swing-trade screener
//!
//! Computes HMA/MACD/RSI indicator state per symbol, scores each against
//! five qualification criteria, aggregates scans over a symbol universe
//! and derives sector-diversified portfolio allocations.

pub mod analysis;
pub mod config;
pub mod handlers {
    pub mod health;
    pub mod portfolio;
    pub mod scan;
    pub mod stocks;
}
pub mod models;
pub mod observability;
pub mod portfolio;
pub mod scanner;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use market_data::{SymbolListing, WeeklySource};

pub use analysis::{AnalysisError, CriteriaEvaluator};
pub use config::{AnalysisParams, PortfolioConfig, ScanConfig, ScreenerConfig};
pub use models::*;
pub use observability::MetricsCollector;
pub use scanner::{ScanError, ScanOptions, ScanOrchestrator, ScanSession};

/// Application state shared across handlers
pub struct AppState {
    pub orchestrator: ScanOrchestrator,
    pub source: Arc<dyn WeeklySource>,
    pub universe: Vec<SymbolListing>,
    pub metrics: MetricsCollector,
}

impl AppState {
    pub fn new(
        source: Arc<dyn WeeklySource>,
        universe: Vec<SymbolListing>,
        config: ScreenerConfig,
    ) -> Self {
        let metrics = MetricsCollector::new();
        Self {
            orchestrator: ScanOrchestrator::new(source.clone(), config, metrics.clone()),
            source,
            universe,
            metrics,
        }
    }
}

/// Build the API router
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/scan", post(handlers::scan::run_scan))
        .route("/api/status", get(handlers::scan::scan_status))
        .route("/api/results", get(handlers::scan::scan_results))
        .route("/api/sectors", get(handlers::scan::sector_analysis))
        .route(
            "/api/portfolio",
            get(handlers::portfolio::portfolio_recommendations),
        )
        .route("/api/stock/{symbol}", get(handlers::stocks::stock_analysis))
        .route("/health", get(handlers::health::health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
