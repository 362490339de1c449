//! Screener configuration - env-var driven with sensible defaults

use std::str::FromStr;
use std::time::Duration;

/// Indicator and criteria parameters for one symbol evaluation
#[derive(Debug, Clone)]
pub struct AnalysisParams {
    /// Short Hull MA period (trend check and stop-loss anchor)
    pub hma_short_period: usize,
    /// Long Hull MA period (upper bound of the entry band)
    pub hma_long_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub rsi_period: usize,
    pub rsi_sma_period: usize,
    pub rsi_wma_period: usize,
    /// Minimum bars for a full five-criteria evaluation
    pub min_bars: usize,
    /// Criteria needed to qualify (2 = permissive, 5 = strict)
    pub min_criteria: u32,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            hma_short_period: 30,
            hma_long_period: 44,
            macd_fast: 3,
            macd_slow: 21,
            macd_signal: 9,
            rsi_period: 9,
            rsi_sma_period: 3,
            rsi_wma_period: 21,
            min_bars: 50,
            min_criteria: 2,
        }
    }
}

/// Scan orchestration settings
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub batch_size: usize,
    /// Courtesy pause between batches, for the price provider
    pub batch_pause: Duration,
    pub lookback_years: u32,
    /// Series shorter than this are skipped before analysis runs
    pub min_weekly_bars: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: 25,
            batch_pause: Duration::from_secs(2),
            lookback_years: 2,
            min_weekly_bars: 20,
        }
    }
}

/// Portfolio construction settings
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    pub max_positions: usize,
    pub max_per_sector: usize,
    /// Whether 5/5 setups ignore the per-sector cap
    pub perfect_bypasses_sector_cap: bool,
    pub allocation_perfect: f64,
    pub allocation_strong: f64,
    pub allocation_good: f64,
    pub allocation_moderate: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            max_positions: 30,
            max_per_sector: 4,
            perfect_bypasses_sector_cap: true,
            allocation_perfect: 4.0,
            allocation_strong: 3.5,
            allocation_good: 3.0,
            allocation_moderate: 2.5,
        }
    }
}

/// Complete screener configuration
#[derive(Debug, Clone, Default)]
pub struct ScreenerConfig {
    pub analysis: AnalysisParams,
    pub scan: ScanConfig,
    pub portfolio: PortfolioConfig,
}

impl ScreenerConfig {
    /// Load configuration from environment variables, keeping defaults
    /// for anything unset
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        cfg.analysis.min_criteria = env_or("SCREENER_MIN_CRITERIA", cfg.analysis.min_criteria);
        cfg.analysis.min_bars = env_or("SCREENER_MIN_BARS", cfg.analysis.min_bars);

        cfg.scan.batch_size = env_or("SCREENER_BATCH_SIZE", cfg.scan.batch_size).max(1);
        cfg.scan.batch_pause = Duration::from_secs(env_or("SCREENER_BATCH_PAUSE_SECS", 2));
        cfg.scan.lookback_years = env_or("SCREENER_LOOKBACK_YEARS", cfg.scan.lookback_years);
        cfg.scan.min_weekly_bars = env_or("SCREENER_MIN_WEEKLY_BARS", cfg.scan.min_weekly_bars);

        cfg.portfolio.max_positions = env_or("SCREENER_MAX_POSITIONS", cfg.portfolio.max_positions);
        cfg.portfolio.max_per_sector =
            env_or("SCREENER_MAX_PER_SECTOR", cfg.portfolio.max_per_sector);
        cfg.portfolio.perfect_bypasses_sector_cap = env_or(
            "SCREENER_PERFECT_BYPASS",
            cfg.portfolio.perfect_bypasses_sector_cap,
        );

        cfg
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_methodology() {
        let cfg = ScreenerConfig::default();
        assert_eq!(cfg.analysis.hma_short_period, 30);
        assert_eq!(cfg.analysis.hma_long_period, 44);
        assert_eq!(cfg.analysis.min_criteria, 2);
        assert_eq!(cfg.analysis.min_bars, 50);
        assert_eq!(cfg.portfolio.max_positions, 30);
        assert_eq!(cfg.portfolio.max_per_sector, 4);
        assert!(cfg.portfolio.perfect_bypasses_sector_cap);
    }
}
