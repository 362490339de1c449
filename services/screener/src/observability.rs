//! In-process metrics for scan instrumentation

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Counter and gauge names used across the service
pub mod metrics {
    pub const SCANS_STARTED: &str = "scans_started_total";
    pub const SCANS_COMPLETED: &str = "scans_completed_total";
    pub const SCANS_FAILED: &str = "scans_failed_total";
    pub const SYMBOLS_ANALYZED: &str = "symbols_analyzed_total";

    pub const LAST_SCAN_DURATION_SECS: &str = "last_scan_duration_secs";
    pub const LAST_SCAN_QUALIFIED: &str = "last_scan_qualified";
}

/// Counter/gauge collector shared across the orchestrator and handlers.
/// Cloning hands out another handle to the same scoreboard.
#[derive(Clone)]
pub struct MetricsCollector {
    started: Instant,
    board: Arc<RwLock<Scoreboard>>,
}

#[derive(Default)]
struct Scoreboard {
    counters: HashMap<&'static str, u64>,
    gauges: HashMap<&'static str, f64>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            board: Arc::default(),
        }
    }

    /// Add to a counter
    pub async fn increment(&self, name: &'static str, by: u64) {
        *self.board.write().await.counters.entry(name).or_default() += by;
    }

    /// Overwrite a gauge
    pub async fn gauge(&self, name: &'static str, value: f64) {
        self.board.write().await.gauges.insert(name, value);
    }

    pub async fn get_counter(&self, name: &str) -> u64 {
        self.board
            .read()
            .await
            .counters
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    /// Serializable snapshot of everything collected so far
    pub async fn snapshot(&self) -> MetricsSnapshot {
        let board = self.board.read().await;
        MetricsSnapshot {
            counters: board
                .counters
                .iter()
                .map(|(&name, &value)| (name.to_string(), value))
                .collect(),
            gauges: board
                .gauges
                .iter()
                .map(|(&name, &value)| (name.to_string(), value))
                .collect(),
            uptime_secs: self.started.elapsed().as_secs(),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSnapshot {
    pub counters: HashMap<String, u64>,
    pub gauges: HashMap<String, f64>,
    pub uptime_secs: u64,
}
