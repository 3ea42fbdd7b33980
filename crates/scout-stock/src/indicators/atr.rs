//! Average True Range with Wilder's smoothing

use crate::error::{Result, StockError};
use crate::model::PriceBar;

/// Largest of high-low, |high-prev close| and |low-prev close|
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let hl = high - low;
    let hpc = (high - prev_close).abs();
    let lpc = (low - prev_close).abs();
    hl.max(hpc).max(lpc)
}

/// ATR over `period` true ranges.
///
/// True range needs a previous close, so the first bar has none. The first
/// ATR is the plain mean of the first `period` true ranges (index `period`).
pub fn atr(bars: &[PriceBar], period: usize) -> Result<Vec<Option<f64>>> {
    if period == 0 {
        return Err(StockError::IndicatorError(
            "ATR period must be > 0".to_string(),
        ));
    }

    let mut values = vec![None; bars.len()];
    if bars.len() <= period {
        return Ok(values);
    }

    let ranges: Vec<f64> = bars
        .windows(2)
        .map(|w| true_range(w[1].high, w[1].low, w[0].close))
        .collect();

    let n = period as f64;
    let mut current = ranges[..period].iter().sum::<f64>() / n;
    values[period] = Some(current);

    for (offset, &tr) in ranges.iter().enumerate().skip(period) {
        current = (current * (n - 1.0) + tr) / n;
        values[offset + 1] = Some(current);
    }

    Ok(values)
}
