//! Scan orchestration - batched universe sweep behind a session state machine

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::analysis::{AnalysisError, CriteriaEvaluator};
use crate::config::ScreenerConfig;
use crate::models::{ScanReport, ScanState, StockAnalysis};
use crate::observability::{metrics, MetricsCollector};
use market_data::{MarketDataError, SymbolListing, WeeklySource};

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("another scan is currently running")]
    AlreadyRunning,

    #[error("scan failed: {0}")]
    Failed(String),

    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Per-scan overrides; anything unset falls back to configuration
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub batch_size: Option<usize>,
    pub min_criteria: Option<u32>,
    /// Scan only the first N universe symbols (quick scan)
    pub sample_size: Option<usize>,
}

/// Scan lifecycle snapshot. Transitions are pure - each returns the
/// successor session and the orchestrator swaps it in under the lock.
#[derive(Debug, Clone, Default)]
pub struct ScanSession {
    pub state: ScanState,
    pub started_at: Option<DateTime<Utc>>,
    pub last_report: Option<ScanReport>,
    pub last_error: Option<String>,
}

impl ScanSession {
    /// Move to Running, rejecting the request if a scan is in flight
    pub fn begin(&self, now: DateTime<Utc>) -> Result<ScanSession, ScanError> {
        if self.state == ScanState::Running {
            return Err(ScanError::AlreadyRunning);
        }
        Ok(ScanSession {
            state: ScanState::Running,
            started_at: Some(now),
            last_report: self.last_report.clone(),
            last_error: None,
        })
    }

    /// Freeze a finished scan as the new last report
    pub fn complete(&self, report: ScanReport) -> ScanSession {
        ScanSession {
            state: ScanState::Completed,
            started_at: self.started_at,
            last_report: Some(report),
            last_error: None,
        }
    }

    /// Record an orchestration-level failure. The failed run publishes no
    /// partial report; an earlier completed one stays visible.
    pub fn fail(&self, message: impl Into<String>) -> ScanSession {
        ScanSession {
            state: ScanState::Error,
            started_at: self.started_at,
            last_report: self.last_report.clone(),
            last_error: Some(message.into()),
        }
    }
}

enum SymbolOutcome {
    Qualified(Box<StockAnalysis>),
    NotQualified { criteria_met: u32 },
    Skipped(String),
}

/// Runs scans over the symbol universe and owns the mutable scan session
pub struct ScanOrchestrator {
    source: Arc<dyn WeeklySource>,
    config: ScreenerConfig,
    metrics: MetricsCollector,
    session: RwLock<ScanSession>,
}

impl ScanOrchestrator {
    pub fn new(
        source: Arc<dyn WeeklySource>,
        config: ScreenerConfig,
        metrics: MetricsCollector,
    ) -> Self {
        Self {
            source,
            config,
            metrics,
            session: RwLock::new(ScanSession::default()),
        }
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Current session snapshot
    pub async fn session(&self) -> ScanSession {
        self.session.read().await.clone()
    }

    /// Last completed scan report, if any
    pub async fn last_report(&self) -> Option<ScanReport> {
        self.session.read().await.last_report.clone()
    }

    /// Provider health passthrough
    pub async fn source_health(&self) -> market_data::SourceHealth {
        self.source.health().await
    }

    /// Run a full scan over `universe`. A scan already in flight rejects
    /// the request instead of queuing behind it.
    pub async fn run_scan(
        &self,
        universe: &[SymbolListing],
        options: &ScanOptions,
    ) -> Result<ScanReport, ScanError> {
        let started = Utc::now();
        {
            let mut session = self.session.write().await;
            *session = session.begin(started)?;
        }
        self.metrics.increment(metrics::SCANS_STARTED, 1).await;

        match self.sweep(universe, options, started).await {
            Ok(report) => {
                self.metrics.increment(metrics::SCANS_COMPLETED, 1).await;
                self.metrics
                    .increment(metrics::SYMBOLS_ANALYZED, report.total_stocks_analyzed as u64)
                    .await;
                self.metrics
                    .gauge(metrics::LAST_SCAN_DURATION_SECS, report.duration_secs)
                    .await;
                self.metrics
                    .gauge(metrics::LAST_SCAN_QUALIFIED, report.qualified.len() as f64)
                    .await;

                let mut session = self.session.write().await;
                *session = session.complete(report.clone());
                Ok(report)
            }
            Err(err) => {
                let message = err.to_string();
                error!("scan aborted: {}", message);
                self.metrics.increment(metrics::SCANS_FAILED, 1).await;

                let mut session = self.session.write().await;
                *session = session.fail(&message);
                Err(ScanError::Failed(message))
            }
        }
    }

    /// On-demand analysis of a single symbol, outside any scan
    pub async fn analyze_symbol(&self, symbol: &str) -> Result<StockAnalysis, ScanError> {
        let bars = self
            .source
            .fetch_weekly_series(symbol, self.config.scan.lookback_years)
            .await?;
        let evaluator = CriteriaEvaluator::new(self.config.analysis.clone());
        let mut analysis = evaluator.analyze(symbol, &bars)?;

        let info = self.source.symbol_info(symbol);
        analysis.name = info.name;
        analysis.sector = info.sector;
        Ok(analysis)
    }

    async fn sweep(
        &self,
        universe: &[SymbolListing],
        options: &ScanOptions,
        started: DateTime<Utc>,
    ) -> anyhow::Result<ScanReport> {
        let min_criteria = options
            .min_criteria
            .unwrap_or(self.config.analysis.min_criteria);
        let batch_size = options
            .batch_size
            .unwrap_or(self.config.scan.batch_size)
            .max(1);

        let universe: Vec<&SymbolListing> = match options.sample_size {
            Some(n) => universe.iter().take(n).collect(),
            None => universe.iter().collect(),
        };
        let total = universe.len();

        let mut params = self.config.analysis.clone();
        params.min_criteria = min_criteria;
        let evaluator = CriteriaEvaluator::new(params);

        info!(
            "starting scan of {} symbols, {} per batch, {}+ criteria to qualify",
            total, batch_size, min_criteria
        );

        let mut qualified: Vec<StockAnalysis> = Vec::new();
        let mut errors: Vec<String> = Vec::new();
        let mut analyzed = 0usize;

        let batches: Vec<&[&SymbolListing]> = universe.chunks(batch_size).collect();
        let batch_count = batches.len();

        for (batch_index, batch) in batches.into_iter().enumerate() {
            debug!("batch {}/{} ({} symbols)", batch_index + 1, batch_count, batch.len());

            for listing in batch {
                match self.scan_symbol(&evaluator, listing).await {
                    Ok(SymbolOutcome::Qualified(analysis)) => {
                        analyzed += 1;
                        info!(
                            "{} qualified - {}/5 criteria ({})",
                            analysis.symbol, analysis.criteria_met, analysis.setup_strength
                        );
                        qualified.push(*analysis);
                    }
                    Ok(SymbolOutcome::NotQualified { criteria_met }) => {
                        analyzed += 1;
                        debug!("{} - {}/5 criteria", listing.symbol, criteria_met);
                    }
                    Ok(SymbolOutcome::Skipped(reason)) => {
                        debug!("{}", reason);
                        errors.push(reason);
                    }
                    Err(err) => {
                        let message = format!("error processing {}: {}", listing.symbol, err);
                        warn!("{}", message);
                        errors.push(message);
                    }
                }
            }

            // courtesy pause for the price provider between batches
            if batch_index + 1 < batch_count && !self.config.scan.batch_pause.is_zero() {
                tokio::time::sleep(self.config.scan.batch_pause).await;
            }
        }

        qualified.sort_by(|a, b| {
            b.criteria_met.cmp(&a.criteria_met).then_with(|| {
                b.risk_reward
                    .partial_cmp(&a.risk_reward)
                    .unwrap_or(Ordering::Equal)
            })
        });

        let mut criteria_distribution: BTreeMap<u32, usize> = BTreeMap::new();
        let mut sector_distribution: HashMap<String, usize> = HashMap::new();
        for stock in &qualified {
            *criteria_distribution.entry(stock.criteria_met).or_insert(0) += 1;
            *sector_distribution.entry(stock.sector.clone()).or_insert(0) += 1;
        }

        let finished = Utc::now();
        let duration_secs = (finished - started).num_milliseconds() as f64 / 1000.0;

        info!(
            "scan complete in {:.1}s: {}/{} analyzed, {} qualified, {} errors",
            duration_secs,
            analyzed,
            total,
            qualified.len(),
            errors.len()
        );

        Ok(ScanReport {
            scan_id: Uuid::new_v4(),
            scan_date: started.date_naive(),
            started_at: started,
            finished_at: finished,
            duration_secs,
            min_criteria,
            total_stocks_to_scan: total,
            total_stocks_analyzed: analyzed,
            qualified,
            criteria_distribution,
            sector_distribution,
            errors,
        })
    }

    /// Fetch and evaluate one symbol. Provider errors bubble up to be
    /// recorded against the scan; they never abort it.
    async fn scan_symbol(
        &self,
        evaluator: &CriteriaEvaluator,
        listing: &SymbolListing,
    ) -> Result<SymbolOutcome, ScanError> {
        let bars = self
            .source
            .fetch_weekly_series(&listing.symbol, self.config.scan.lookback_years)
            .await?;

        if bars.len() < self.config.scan.min_weekly_bars {
            return Ok(SymbolOutcome::Skipped(format!(
                "insufficient data for {} ({} weeks)",
                listing.symbol,
                bars.len()
            )));
        }

        let mut analysis = match evaluator.analyze(&listing.symbol, &bars) {
            Ok(analysis) => analysis,
            Err(err) => {
                return Ok(SymbolOutcome::Skipped(format!(
                    "analysis failed for {}: {}",
                    listing.symbol, err
                )));
            }
        };

        analysis.name = listing.name.clone();
        if analysis.qualified {
            // sector lookup only for symbols that make the report
            analysis.sector = self.source.symbol_info(&listing.symbol).sector;
            Ok(SymbolOutcome::Qualified(Box::new(analysis)))
        } else {
            Ok(SymbolOutcome::NotQualified {
                criteria_met: analysis.criteria_met,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_report() -> ScanReport {
        ScanReport {
            scan_id: Uuid::new_v4(),
            scan_date: Utc::now().date_naive(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            duration_secs: 0.1,
            min_criteria: 2,
            total_stocks_to_scan: 1,
            total_stocks_analyzed: 1,
            qualified: vec![],
            criteria_distribution: BTreeMap::new(),
            sector_distribution: HashMap::new(),
            errors: vec![],
        }
    }

    #[test]
    fn session_begins_from_idle() {
        let session = ScanSession::default();
        assert_eq!(session.state, ScanState::Idle);

        let running = session.begin(Utc::now()).unwrap();
        assert_eq!(running.state, ScanState::Running);
        assert!(running.started_at.is_some());
    }

    #[test]
    fn running_session_rejects_a_second_begin() {
        let running = ScanSession::default().begin(Utc::now()).unwrap();
        assert!(matches!(
            running.begin(Utc::now()),
            Err(ScanError::AlreadyRunning)
        ));
    }

    #[test]
    fn complete_freezes_the_report() {
        let running = ScanSession::default().begin(Utc::now()).unwrap();
        let completed = running.complete(dummy_report());
        assert_eq!(completed.state, ScanState::Completed);
        assert!(completed.last_report.is_some());
        assert!(completed.last_error.is_none());

        // a later scan may start again from Completed
        assert!(completed.begin(Utc::now()).is_ok());
    }

    #[test]
    fn fail_keeps_the_previous_report() {
        let completed = ScanSession::default()
            .begin(Utc::now())
            .unwrap()
            .complete(dummy_report());
        let failed = completed
            .begin(Utc::now())
            .unwrap()
            .fail("provider exploded");

        assert_eq!(failed.state, ScanState::Error);
        assert_eq!(failed.last_error.as_deref(), Some("provider exploded"));
        // the aborted run publishes nothing, the old report stays
        assert!(failed.last_report.is_some());
    }
}
