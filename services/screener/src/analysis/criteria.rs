//! Five-criteria evaluation of one symbol's weekly series

use crate::analysis::indicators;
use crate::config::AnalysisParams;
use crate::models::{round2, CriteriaDetails, SetupStrength, StockAnalysis};
use market_data::WeeklyBar;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("insufficient history: {got} bars, need {need}")]
    InsufficientData { got: usize, need: usize },
}

/// Evaluates a weekly price series against the five swing-setup criteria
/// and derives risk parameters for qualifying symbols.
pub struct CriteriaEvaluator {
    params: AnalysisParams,
}

impl CriteriaEvaluator {
    pub fn new(params: AnalysisParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// Run the full five-criteria analysis. `bars` must be ascending by
    /// date; the series is read-only input.
    pub fn analyze(&self, symbol: &str, bars: &[WeeklyBar]) -> Result<StockAnalysis, AnalysisError> {
        let params = &self.params;
        if bars.len() < params.min_bars {
            return Err(AnalysisError::InsufficientData {
                got: bars.len(),
                need: params.min_bars,
            });
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let current_price = closes[closes.len() - 1];

        let hma_short = indicators::hma(&closes, params.hma_short_period);
        let hma_long = indicators::hma(&closes, params.hma_long_period);
        let macd = indicators::macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal);
        let rsi = indicators::rsi(
            &closes,
            params.rsi_period,
            params.rsi_sma_period,
            params.rsi_wma_period,
        );

        let hma_short_latest = last_or_zero(&hma_short);
        let hma_long_latest = last_or_zero(&hma_long);

        let mut details = CriteriaDetails {
            // the methodology is calibrated to weekly bars, which is what
            // this evaluator receives
            weekly_timeframe: true,
            ..CriteriaDetails::default()
        };

        // 1. Short HMA rising week over week
        if hma_short.len() >= 2 {
            let latest = hma_short[hma_short.len() - 1];
            let previous = hma_short[hma_short.len() - 2];
            details.hma_trend = latest.is_finite() && previous.is_finite() && latest > previous;
        }

        // 2. Close inside the [short HMA, long HMA] band, inclusive. An
        // inverted band (short above long) contains nothing.
        if hma_short_latest > 0.0 && hma_long_latest > 0.0 {
            details.price_position =
                hma_short_latest <= current_price && current_price <= hma_long_latest;
        }

        // 3. Extended bearish histogram stretch with MACD now back above
        // its signal line
        if macd.histogram.len() >= 10 {
            let window_start = macd.histogram.len().saturating_sub(20);
            let bars_below_zero = macd.histogram[window_start..]
                .iter()
                .filter(|h| **h < 0.0)
                .count();
            let latest_macd = last_or_zero(&macd.macd);
            let latest_signal = last_or_zero(&macd.signal);
            details.macd_setup = bars_below_zero >= 8 && latest_macd > latest_signal;
        }

        // 4. RSI above its long WMA with the short SMA confirming
        let rsi_latest = last_or_nan(&rsi.rsi);
        let rsi_sma_latest = last_or_nan(&rsi.sma);
        let rsi_wma_latest = last_or_nan(&rsi.wma);
        if rsi_latest.is_finite() && rsi_sma_latest.is_finite() && rsi_wma_latest.is_finite() {
            details.rsi_crossover = rsi_latest > rsi_wma_latest && rsi_sma_latest > rsi_wma_latest;
        }

        let criteria_met = details.count();
        let qualified = criteria_met >= params.min_criteria;
        let setup_strength = SetupStrength::from_criteria_met(criteria_met);

        // Stop 5% below the short HMA, or below price while the HMA window
        // is still filling; target a fixed 15% above the close
        let stop_loss = if hma_short_latest > 0.0 {
            hma_short_latest * 0.95
        } else {
            current_price * 0.95
        };
        let target = current_price * 1.15;
        let risk_reward = if current_price > stop_loss {
            (target - current_price) / (current_price - stop_loss)
        } else {
            0.0
        };

        Ok(StockAnalysis {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            sector: "Unknown".to_string(),
            current_price,
            hma_short: hma_short_latest,
            hma_long: hma_long_latest,
            criteria_met,
            criteria_details: details,
            qualified,
            setup_strength,
            confidence_level: setup_strength.confidence_label().to_string(),
            stop_loss: round2(stop_loss),
            target: round2(target),
            risk_reward: round2(risk_reward),
            analysis_date: bars.last().map(|b| b.timestamp.date_naive()),
        })
    }
}

fn last_or_zero(series: &[f64]) -> f64 {
    series
        .last()
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn last_or_nan(series: &[f64]) -> f64 {
    series.last().copied().unwrap_or(f64::NAN)
}
