//! Scan endpoints - trigger, status, results, sector rollup

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::models::{ScanReport, ScanState, SectorAnalysisReport};
use crate::scanner::{ScanError, ScanOptions};
use crate::AppState;

#[derive(Debug, Default, serde::Deserialize)]
pub struct ScanRequest {
    pub batch_size: Option<usize>,
    pub min_criteria: Option<u32>,
    /// Scan only the first N universe symbols (quick scan)
    pub sample_size: Option<usize>,
}

#[derive(Debug, serde::Serialize)]
pub struct ScanTriggered {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ScanReport>,
}

/// POST /api/scan - run a scan over the universe. Responds once the scan
/// finishes; a concurrent request gets `already_running` instead.
pub async fn run_scan(
    State(state): State<Arc<AppState>>,
    Query(req): Query<ScanRequest>,
) -> (StatusCode, Json<ScanTriggered>) {
    info!("scan requested");

    let options = ScanOptions {
        batch_size: req.batch_size,
        min_criteria: req.min_criteria,
        sample_size: req.sample_size,
    };

    match state.orchestrator.run_scan(&state.universe, &options).await {
        Ok(report) => (
            StatusCode::OK,
            Json(ScanTriggered {
                status: "success",
                message: None,
                report: Some(report),
            }),
        ),
        Err(ScanError::AlreadyRunning) => (
            StatusCode::CONFLICT,
            Json(ScanTriggered {
                status: "already_running",
                message: Some("another scan is currently running".to_string()),
                report: None,
            }),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ScanTriggered {
                status: "error",
                message: Some(err.to_string()),
                report: None,
            }),
        ),
    }
}

#[derive(Debug, serde::Serialize)]
pub struct StatusResponse {
    pub state: ScanState,
    pub scan_in_progress: bool,
    pub last_scan_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub universe_size: usize,
    pub min_criteria: u32,
    pub qualified_count: usize,
    pub criteria_distribution: BTreeMap<u32, usize>,
    pub top_sectors: Vec<(String, usize)>,
}

/// GET /api/status - scanner status snapshot
pub async fn scan_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let session = state.orchestrator.session().await;
    let report = session.last_report.as_ref();

    let top_sectors = report
        .map(|r| {
            let mut sectors: Vec<(String, usize)> = r
                .sector_distribution
                .iter()
                .map(|(sector, count)| (sector.clone(), *count))
                .collect();
            sectors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            sectors.truncate(10);
            sectors
        })
        .unwrap_or_default();

    Json(StatusResponse {
        state: session.state,
        scan_in_progress: session.state == ScanState::Running,
        last_scan_time: report.map(|r| r.finished_at),
        last_error: session.last_error.clone(),
        universe_size: state.universe.len(),
        min_criteria: state.orchestrator.config().analysis.min_criteria,
        qualified_count: report.map(|r| r.qualified.len()).unwrap_or(0),
        criteria_distribution: report
            .map(|r| r.criteria_distribution.clone())
            .unwrap_or_default(),
        top_sectors,
    })
}

/// GET /api/results - last completed scan report
pub async fn scan_results(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScanReport>, (StatusCode, String)> {
    state
        .orchestrator
        .last_report()
        .await
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "no completed scan yet".to_string()))
}

/// GET /api/sectors - sector-wise rollup of the last scan
pub async fn sector_analysis(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SectorAnalysisReport>, (StatusCode, String)> {
    let report = state
        .orchestrator
        .last_report()
        .await
        .ok_or((StatusCode::NOT_FOUND, "no completed scan yet".to_string()))?;
    Ok(Json(SectorAnalysisReport::from_report(&report)))
}
