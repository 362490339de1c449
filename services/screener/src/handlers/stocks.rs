//! Single-symbol analysis endpoint

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::warn;

use crate::models::StockAnalysis;
use crate::scanner::ScanError;
use crate::AppState;
use market_data::MarketDataError;

/// GET /api/stock/{symbol} - on-demand analysis of one symbol
pub async fn stock_analysis(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<StockAnalysis>, (StatusCode, String)> {
    let mut symbol = symbol.to_uppercase();
    // bare NSE tickers get the exchange suffix the provider expects
    if !symbol.contains('.') {
        symbol.push_str(".NS");
    }

    match state.orchestrator.analyze_symbol(&symbol).await {
        Ok(analysis) => Ok(Json(analysis)),
        Err(ScanError::MarketData(MarketDataError::NoData(_))) => Err((
            StatusCode::NOT_FOUND,
            format!("no price history for {}", symbol),
        )),
        Err(ScanError::Analysis(err)) => {
            Err((StatusCode::UNPROCESSABLE_ENTITY, err.to_string()))
        }
        Err(ScanError::MarketData(err)) => {
            warn!("provider error for {}: {}", symbol, err);
            Err((StatusCode::BAD_GATEWAY, err.to_string()))
        }
        Err(err) => Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string())),
    }
}
