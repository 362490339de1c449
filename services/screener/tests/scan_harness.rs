//! End-to-end scan harness with a mock weekly price source
//!
//! Validates the full orchestration path:
//! universe -> fetch -> evaluate -> aggregate -> report -> portfolio

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use market_data::{
    MarketDataError, SourceHealth, SymbolInfo, SymbolListing, WeeklyBar, WeeklySource,
};
use screener::{
    portfolio, ScanError, ScanOptions, ScanOrchestrator, ScanState, ScreenerConfig,
};

/// Mock price source backed by canned series
struct MockWeeklySource {
    series: HashMap<String, Vec<WeeklyBar>>,
    sectors: HashMap<String, String>,
    fetch_delay: Option<Duration>,
}

impl MockWeeklySource {
    fn new() -> Self {
        Self {
            series: HashMap::new(),
            sectors: HashMap::new(),
            fetch_delay: None,
        }
    }

    fn with_series(mut self, symbol: &str, sector: &str, bars: Vec<WeeklyBar>) -> Self {
        self.series.insert(symbol.to_string(), bars);
        self.sectors.insert(symbol.to_string(), sector.to_string());
        self
    }

    fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }
}

#[async_trait]
impl WeeklySource for MockWeeklySource {
    async fn fetch_weekly_series(
        &self,
        symbol: &str,
        _lookback_years: u32,
    ) -> market_data::Result<Vec<WeeklyBar>> {
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        match self.series.get(symbol) {
            Some(bars) => Ok(bars.clone()),
            None => Err(MarketDataError::NoData(symbol.to_string())),
        }
    }

    fn symbol_info(&self, symbol: &str) -> SymbolInfo {
        SymbolInfo {
            symbol: symbol.to_string(),
            name: format!("{} Ltd", symbol.trim_end_matches(".NS")),
            sector: self
                .sectors
                .get(symbol)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }

    async fn health(&self) -> SourceHealth {
        SourceHealth {
            source: "mock".to_string(),
            is_healthy: true,
            last_success: Some(Utc::now()),
            last_error: None,
            success_rate: 1.0,
            last_latency_ms: 1,
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

fn weekly_bars(closes: &[f64]) -> Vec<WeeklyBar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| WeeklyBar {
            timestamp: start + ChronoDuration::weeks(i as i64),
            open: close,
            high: close * 1.02,
            low: close * 0.98,
            close,
            volume: 1_000_000.0,
        })
        .collect()
}

/// Steady weekly uptrend: trend + timeframe criteria hold, nothing else
fn uptrend(bars: usize, slope: f64) -> Vec<WeeklyBar> {
    weekly_bars(&(0..bars).map(|i| 100.0 + slope * i as f64).collect::<Vec<_>>())
}

fn listing(symbol: &str) -> SymbolListing {
    SymbolListing {
        symbol: symbol.to_string(),
        name: format!("{} Ltd", symbol.trim_end_matches(".NS")),
    }
}

fn test_config() -> ScreenerConfig {
    let mut config = ScreenerConfig::default();
    // keep tests fast, the courtesy pause is for real providers
    config.scan.batch_pause = Duration::ZERO;
    config
}

fn orchestrator(source: MockWeeklySource, config: ScreenerConfig) -> ScanOrchestrator {
    ScanOrchestrator::new(
        Arc::new(source),
        config,
        screener::MetricsCollector::new(),
    )
}

#[tokio::test]
async fn scan_skips_bad_symbols_without_aborting() {
    let source = MockWeeklySource::new()
        .with_series("AAA.NS", "Energy", uptrend(60, 1.0))
        .with_series("BBB.NS", "Metals", uptrend(60, 2.0))
        .with_series("CCC.NS", "FMCG", uptrend(60, 0.5))
        .with_series("DDD.NS", "Telecom", uptrend(60, 1.5))
        .with_series("EMPTY.NS", "Energy", vec![]);

    let universe: Vec<SymbolListing> = ["AAA.NS", "BBB.NS", "CCC.NS", "DDD.NS", "EMPTY.NS"]
        .iter()
        .map(|s| listing(s))
        .collect();

    let orchestrator = orchestrator(source, test_config());
    let report = orchestrator
        .run_scan(&universe, &ScanOptions::default())
        .await
        .expect("scan should complete");

    assert_eq!(report.total_stocks_to_scan, 5);
    assert_eq!(report.total_stocks_analyzed, 4);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("EMPTY.NS"));

    // the session froze the same report
    let session = orchestrator.session().await;
    assert_eq!(session.state, ScanState::Completed);
    assert_eq!(
        session.last_report.as_ref().map(|r| r.scan_id),
        Some(report.scan_id)
    );
}

#[tokio::test]
async fn qualified_list_is_sorted_and_aggregated() {
    let source = MockWeeklySource::new()
        .with_series("AAA.NS", "Energy", uptrend(60, 0.5))
        .with_series("BBB.NS", "Metals", uptrend(60, 1.0))
        .with_series("CCC.NS", "FMCG", uptrend(60, 2.0))
        .with_series("DDD.NS", "Energy", uptrend(60, 3.0));

    let universe: Vec<SymbolListing> = ["AAA.NS", "BBB.NS", "CCC.NS", "DDD.NS"]
        .iter()
        .map(|s| listing(s))
        .collect();

    let orchestrator = orchestrator(source, test_config());
    let report = orchestrator
        .run_scan(&universe, &ScanOptions::default())
        .await
        .unwrap();

    assert_eq!(report.qualified.len(), 4);

    // non-increasing in (criteria_met, risk_reward)
    for pair in report.qualified.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.criteria_met > b.criteria_met
                || (a.criteria_met == b.criteria_met && a.risk_reward >= b.risk_reward)
        );
    }

    // distributions cover exactly the qualifying list
    let criteria_total: usize = report.criteria_distribution.values().sum();
    assert_eq!(criteria_total, report.qualified.len());
    let sector_total: usize = report.sector_distribution.values().sum();
    assert_eq!(sector_total, report.qualified.len());
    assert_eq!(report.sector_distribution["Energy"], 2);

    // metadata came from the collaborator lookup
    assert!(report.qualified.iter().all(|s| s.sector != "Unknown"));
    assert!(report.qualified.iter().all(|s| s.qualified));
    assert!(report.duration_secs >= 0.0);
}

#[tokio::test]
async fn second_scan_is_rejected_while_first_runs() {
    let source = MockWeeklySource::new()
        .with_series("AAA.NS", "Energy", uptrend(60, 1.0))
        .with_series("BBB.NS", "Metals", uptrend(60, 1.0))
        .with_fetch_delay(Duration::from_millis(150));

    let universe: Vec<SymbolListing> =
        ["AAA.NS", "BBB.NS"].iter().map(|s| listing(s)).collect();

    let orchestrator = Arc::new(orchestrator(source, test_config()));

    let background = {
        let orchestrator = orchestrator.clone();
        let universe = universe.clone();
        tokio::spawn(async move {
            orchestrator
                .run_scan(&universe, &ScanOptions::default())
                .await
        })
    };

    // give the first scan time to take the session
    tokio::time::sleep(Duration::from_millis(50)).await;

    let rejected = orchestrator
        .run_scan(&universe, &ScanOptions::default())
        .await;
    assert!(matches!(rejected, Err(ScanError::AlreadyRunning)));

    let first = background.await.unwrap();
    assert!(first.is_ok());
    assert_eq!(orchestrator.session().await.state, ScanState::Completed);
}

#[tokio::test]
async fn stricter_threshold_empties_the_qualifying_list() {
    let source = MockWeeklySource::new()
        .with_series("AAA.NS", "Energy", uptrend(60, 1.0))
        .with_series("BBB.NS", "Metals", uptrend(60, 2.0));

    let universe: Vec<SymbolListing> =
        ["AAA.NS", "BBB.NS"].iter().map(|s| listing(s)).collect();

    let orchestrator = orchestrator(source, test_config());

    let strict = ScanOptions {
        min_criteria: Some(5),
        ..ScanOptions::default()
    };
    let report = orchestrator.run_scan(&universe, &strict).await.unwrap();

    assert_eq!(report.min_criteria, 5);
    assert_eq!(report.total_stocks_analyzed, 2);
    assert!(report.qualified.is_empty());
}

#[tokio::test]
async fn sample_size_limits_the_universe() {
    let source = MockWeeklySource::new()
        .with_series("AAA.NS", "Energy", uptrend(60, 1.0))
        .with_series("BBB.NS", "Metals", uptrend(60, 1.0))
        .with_series("CCC.NS", "FMCG", uptrend(60, 1.0));

    let universe: Vec<SymbolListing> = ["AAA.NS", "BBB.NS", "CCC.NS"]
        .iter()
        .map(|s| listing(s))
        .collect();

    let orchestrator = orchestrator(source, test_config());
    let quick = ScanOptions {
        sample_size: Some(2),
        ..ScanOptions::default()
    };
    let report = orchestrator.run_scan(&universe, &quick).await.unwrap();

    assert_eq!(report.total_stocks_to_scan, 2);
    assert_eq!(report.total_stocks_analyzed, 2);
}

#[tokio::test]
async fn portfolio_built_from_a_scan_respects_caps() {
    let mut source = MockWeeklySource::new();
    let mut universe = Vec::new();
    // six qualifying symbols crowded into one sector, two elsewhere
    for i in 0..6 {
        let symbol = format!("BANK{i}.NS");
        source = source.with_series(&symbol, "Financial Services", uptrend(60, 1.0 + i as f64 * 0.2));
        universe.push(listing(&symbol));
    }
    source = source
        .with_series("ENER.NS", "Energy", uptrend(60, 1.0))
        .with_series("META.NS", "Metals", uptrend(60, 1.0));
    universe.push(listing("ENER.NS"));
    universe.push(listing("META.NS"));

    let config = test_config();
    let orchestrator = ScanOrchestrator::new(
        Arc::new(source),
        config.clone(),
        screener::MetricsCollector::new(),
    );
    let report = orchestrator
        .run_scan(&universe, &ScanOptions::default())
        .await
        .unwrap();
    assert_eq!(report.qualified.len(), 8);

    let portfolio = portfolio::build(&report, &config.portfolio);
    assert!(portfolio.portfolio_size <= config.portfolio.max_positions);

    // no tier-5 setups here, so the sector cap binds everywhere
    assert_eq!(
        portfolio.diversification.sector_breakdown["Financial Services"],
        config.portfolio.max_per_sector
    );
    assert_eq!(portfolio.portfolio_size, 6);
    assert!(portfolio
        .entries
        .iter()
        .all(|e| e.allocation_percent == config.portfolio.allocation_moderate));
}

#[tokio::test]
async fn analyze_symbol_resolves_metadata() {
    let source = MockWeeklySource::new().with_series("AAA.NS", "Energy", uptrend(60, 1.0));
    let orchestrator = orchestrator(source, test_config());

    let analysis = orchestrator.analyze_symbol("AAA.NS").await.unwrap();
    assert_eq!(analysis.symbol, "AAA.NS");
    assert_eq!(analysis.name, "AAA Ltd");
    assert_eq!(analysis.sector, "Energy");
    assert_eq!(analysis.criteria_met, analysis.criteria_details.count());

    let missing = orchestrator.analyze_symbol("GHOST.NS").await;
    assert!(matches!(
        missing,
        Err(ScanError::MarketData(MarketDataError::NoData(_)))
    ));
}
