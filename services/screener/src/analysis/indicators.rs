//! Indicator math over weekly close series
//!
//! All functions are pure and return a series aligned index-for-index with
//! the input. Positions where a rolling window is not yet full are
//! `f64::NAN` and propagate through downstream windows; short or invalid
//! inputs produce an all-NaN series rather than an error.

/// Simple moving average over `period` values.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    // Running sum over the window, rebuilt after any NaN run since NaN
    // poisons the accumulator
    let mut run = 0usize;
    let mut sum = 0.0;
    for i in 0..values.len() {
        let incoming = values[i];
        if incoming.is_nan() {
            run = 0;
            continue;
        }
        run += 1;
        if run < period {
            continue;
        }
        if run == period {
            sum = values[i + 1 - period..=i].iter().sum();
        } else {
            sum += incoming - values[i - period];
        }
        out[i] = sum / period as f64;
    }
    out
}

/// Linearly weighted moving average. Weights run 1..=period with the most
/// recent value weighted heaviest.
pub fn wma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let weight_total = (period * (period + 1) / 2) as f64;
    let newest_weight = period as f64;

    let mut run = 0usize;
    let mut plain_sum = 0.0;
    let mut weighted_sum = 0.0;
    for i in 0..values.len() {
        let incoming = values[i];
        if incoming.is_nan() {
            run = 0;
            continue;
        }
        run += 1;
        if run < period {
            continue;
        }
        if run == period {
            plain_sum = 0.0;
            weighted_sum = 0.0;
            for (offset, &value) in values[i + 1 - period..=i].iter().enumerate() {
                plain_sum += value;
                weighted_sum += value * (offset + 1) as f64;
            }
        } else {
            // Sliding one step drops weight 1 from the oldest value and
            // shifts every other weight down by one
            weighted_sum += newest_weight * incoming - plain_sum;
            plain_sum += incoming - values[i - period];
        }
        out[i] = weighted_sum / weight_total;
    }
    out
}

/// Exponentially weighted mean with smoothing factor `2 / (span + 1)`,
/// normalised over the observed history so values exist from index 0.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if span == 0 {
        return out;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &value) in values.iter().enumerate() {
        numerator = value + decay * numerator;
        denominator = 1.0 + decay * denominator;
        out[i] = numerator / denominator;
    }
    out
}

/// Hull moving average: WMA(2 * WMA(n/2) - WMA(n), sqrt(n)).
///
/// Needs `period >= 2` and at least `period` values, otherwise the whole
/// output is NaN.
pub fn hma(values: &[f64], period: usize) -> Vec<f64> {
    if period < 2 || values.len() < period {
        return vec![f64::NAN; values.len()];
    }

    let half = period / 2;
    let sqrt_len = (period as f64).sqrt().floor() as usize;

    let wma_half = wma(values, half);
    let wma_full = wma(values, period);

    let raw: Vec<f64> = wma_half
        .iter()
        .zip(&wma_full)
        .map(|(half_value, full_value)| 2.0 * half_value - full_value)
        .collect();

    wma(&raw, sqrt_len)
}

/// MACD line, signal line and histogram
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Custom MACD. Unlike the WMA-based indicators the EMAs have no warm-up
/// gap, so every position is defined from index 0.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdSeries {
    let ema_fast = ema(values, fast);
    let ema_slow = ema(values, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = ema(&macd_line, signal_span);

    let histogram: Vec<f64> = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    MacdSeries {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}

/// RSI with its short SMA and long WMA overlays
#[derive(Debug, Clone)]
pub struct RsiSeries {
    pub rsi: Vec<f64>,
    pub sma: Vec<f64>,
    pub wma: Vec<f64>,
}

/// RSI over rolling mean gains/losses, plus SMA and WMA of the RSI line.
///
/// A window with zero losses saturates to 100, zero gains saturates to 0.
/// A window with no movement at all leaves the value undefined; comparisons
/// against it read as a non-match downstream.
pub fn rsi(values: &[f64], period: usize, sma_period: usize, wma_period: usize) -> RsiSeries {
    let len = values.len();
    let mut rsi_line = vec![f64::NAN; len];

    if period == 0 || len < period + 1 {
        return RsiSeries {
            rsi: rsi_line,
            sma: vec![f64::NAN; len],
            wma: vec![f64::NAN; len],
        };
    }

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for i in 1..len {
        let delta = values[i] - values[i - 1];
        gain_sum += delta.max(0.0);
        loss_sum += (-delta).max(0.0);

        if i > period {
            let leaving = values[i - period] - values[i - period - 1];
            gain_sum -= leaving.max(0.0);
            loss_sum -= (-leaving).max(0.0);
        }

        if i >= period {
            let gain = gain_sum / period as f64;
            let loss = loss_sum / period as f64;
            rsi_line[i] = if loss == 0.0 && gain == 0.0 {
                f64::NAN
            } else if loss == 0.0 {
                100.0
            } else if gain == 0.0 {
                0.0
            } else {
                100.0 - 100.0 / (1.0 + gain / loss)
            };
        }
    }

    let sma_line = sma(&rsi_line, sma_period);
    let wma_line = wma(&rsi_line, wma_period);

    RsiSeries {
        rsi: rsi_line,
        sma: sma_line,
        wma: wma_line,
    }
}
