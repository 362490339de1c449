//! Portfolio recommendation endpoint

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::models::PortfolioReport;
use crate::portfolio;
use crate::AppState;

/// GET /api/portfolio - allocation list built from the last scan
pub async fn portfolio_recommendations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PortfolioReport>, (StatusCode, String)> {
    let report = state.orchestrator.last_report().await.ok_or((
        StatusCode::NOT_FOUND,
        "no completed scan yet; run /api/scan first".to_string(),
    ))?;

    Ok(Json(portfolio::build(
        &report,
        &state.orchestrator.config().portfolio,
    )))
}
