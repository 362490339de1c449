//! Yahoo Finance chart API client for weekly price history

use crate::types::*;
use crate::universe;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Request bookkeeping so health() never spends an API call
#[derive(Default)]
struct RequestStats {
    ok_count: AtomicU64,
    err_count: AtomicU64,
    /// Millis since epoch of the most recent success / failure
    last_ok_ms: AtomicU64,
    last_err_ms: AtomicU64,
    last_latency_ms: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl RequestStats {
    fn record_ok(&self, latency: Duration) {
        let now_ms = Utc::now().timestamp_millis() as u64;
        self.last_ok_ms.store(now_ms, Ordering::Relaxed);
        self.last_latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
        self.ok_count.fetch_add(1, Ordering::Relaxed);
    }

    async fn record_err(&self, message: impl Into<String>) {
        let now_ms = Utc::now().timestamp_millis() as u64;
        self.last_err_ms.store(now_ms, Ordering::Relaxed);
        self.err_count.fetch_add(1, Ordering::Relaxed);
        *self.last_error.lock().await = Some(message.into());
    }

    /// Healthy once a request has succeeded and nothing failed since
    fn healthy(&self) -> bool {
        let last_ok = self.last_ok_ms.load(Ordering::Relaxed);
        last_ok > 0 && last_ok >= self.last_err_ms.load(Ordering::Relaxed)
    }

    fn success_rate(&self) -> f64 {
        let ok = self.ok_count.load(Ordering::Relaxed) as f64;
        let err = self.err_count.load(Ordering::Relaxed) as f64;
        if ok + err == 0.0 {
            // no traffic yet
            return 1.0;
        }
        ok / (ok + err)
    }
}

/// Yahoo Finance `v8/finance/chart` client
pub struct YahooChartClient {
    client: Client,
    base_url: String,
    last_request: Mutex<Instant>,
    stats: RequestStats,
}

impl YahooChartClient {
    /// Per-request timeout (10 seconds for individual API calls)
    const REQUEST_TIMEOUT_SECS: u64 = 10;

    /// Minimum gap between requests, the unauthenticated chart API is
    /// sensitive to bursts
    const MIN_REQUEST_GAP_MS: u64 = 200;

    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; swingscan/0.1)")
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to create HTTP client");

        // backdate the request clock so the first call is not delayed
        let warm_start = Instant::now()
            .checked_sub(Duration::from_secs(1))
            .unwrap_or_else(Instant::now);

        Self {
            client,
            base_url: "https://query1.finance.yahoo.com".to_string(),
            last_request: Mutex::new(warm_start),
            stats: RequestStats::default(),
        }
    }

    /// Point the client at a different host (tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn chart_request(&self, symbol: &str, lookback_years: u32) -> Result<ChartResult> {
        let request_start = Instant::now();

        // Courtesy delay between requests
        {
            let mut last = self.last_request.lock().await;
            let elapsed = last.elapsed();
            let min_gap = Duration::from_millis(Self::MIN_REQUEST_GAP_MS);
            if elapsed < min_gap {
                tokio::time::sleep(min_gap - elapsed).await;
            }
            *last = Instant::now();
        }

        let url = format!(
            "{}/v8/finance/chart/{}?range={}y&interval=1wk",
            self.base_url, symbol, lookback_years
        );

        let request_future = self.client.get(&url).send();
        let response = match tokio::time::timeout(
            Duration::from_secs(Self::REQUEST_TIMEOUT_SECS),
            request_future,
        )
        .await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                self.stats.record_err(e.to_string()).await;
                return Err(MarketDataError::ApiError(e.to_string()));
            }
            Err(_) => {
                let message = format!(
                    "chart request for {} timed out after {}s",
                    symbol,
                    Self::REQUEST_TIMEOUT_SECS
                );
                self.stats.record_err(message.as_str()).await;
                return Err(MarketDataError::ApiError(message));
            }
        };

        let status = response.status();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            self.stats.record_err("rate limited").await;
            return Err(MarketDataError::RateLimited {
                provider: "yahoo".to_string(),
                retry_after,
            });
        }

        if status == 404 {
            // Unknown/delisted symbols come back as 404 with an error body
            let text = response.text().await.unwrap_or_default();
            let description = serde_json::from_str::<ChartEnvelope>(&text)
                .ok()
                .and_then(|b| b.chart.error)
                .map(|e| e.description)
                .unwrap_or_else(|| "symbol not found".to_string());
            tracing::debug!("no chart data for {}: {}", symbol, description);
            self.stats.record_err(description).await;
            return Err(MarketDataError::NoData(symbol.to_string()));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = format!("chart API error ({}): {}", status, text);
            self.stats.record_err(message.as_str()).await;
            return Err(MarketDataError::ApiError(message));
        }

        let latency = request_start.elapsed();

        let body: ChartEnvelope = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                self.stats.record_err(e.to_string()).await;
                return Err(MarketDataError::InvalidResponse(e.to_string()));
            }
        };

        if let Some(err) = body.chart.error {
            let message = format!("{}: {}", err.code, err.description);
            self.stats.record_err(message.as_str()).await;
            return Err(MarketDataError::ApiError(message));
        }

        let result = match body.chart.result.unwrap_or_default().into_iter().next() {
            Some(result) => result,
            None => {
                self.stats.record_err("empty chart result").await;
                return Err(MarketDataError::NoData(symbol.to_string()));
            }
        };

        self.stats.record_ok(latency);
        Ok(result)
    }
}

impl Default for YahooChartClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WeeklySource for YahooChartClient {
    async fn fetch_weekly_series(
        &self,
        symbol: &str,
        lookback_years: u32,
    ) -> Result<Vec<WeeklyBar>> {
        let result = self.chart_request(symbol, lookback_years).await?;

        let timestamps = result.timestamp.unwrap_or_default();
        if timestamps.is_empty() {
            return Err(MarketDataError::NoData(symbol.to_string()));
        }

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::InvalidResponse("missing quote block".to_string()))?;

        // Rows with missing fields (holiday weeks, partial data) are dropped
        let mut bars: Vec<WeeklyBar> = timestamps
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                Some(WeeklyBar {
                    timestamp: DateTime::from_timestamp(ts, 0)?,
                    open: *quote.open.get(i)?.as_ref()?,
                    high: *quote.high.get(i)?.as_ref()?,
                    low: *quote.low.get(i)?.as_ref()?,
                    close: *quote.close.get(i)?.as_ref()?,
                    volume: *quote.volume.get(i)?.as_ref()?,
                })
            })
            .collect();

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    fn symbol_info(&self, symbol: &str) -> SymbolInfo {
        universe::info(symbol)
    }

    async fn health(&self) -> SourceHealth {
        let last_ok_ms = self.stats.last_ok_ms.load(Ordering::Relaxed);

        SourceHealth {
            source: self.name().to_string(),
            is_healthy: self.stats.healthy(),
            last_success: (last_ok_ms > 0)
                .then(|| DateTime::from_timestamp_millis(last_ok_ms as i64))
                .flatten(),
            last_error: self.stats.last_error.lock().await.clone(),
            success_rate: self.stats.success_rate(),
            last_latency_ms: self.stats.last_latency_ms.load(Ordering::Relaxed),
        }
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

// Response types for the chart API
#[derive(Debug, serde::Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, serde::Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, serde::Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, serde::Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, serde::Deserialize)]
struct ChartIndicators {
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, serde::Deserialize)]
struct QuoteBlock {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}
