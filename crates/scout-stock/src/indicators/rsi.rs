//! Relative Strength Index with Wilder's smoothing

use crate::error::{Result, StockError};

/// RSI over `period` price changes.
///
/// The first value appears at index `period` (it needs `period + 1` closes).
/// A window with neither gains nor losses reads 50.
pub fn rsi(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    if period == 0 {
        return Err(StockError::IndicatorError(
            "RSI period must be > 0".to_string(),
        ));
    }

    let mut values = vec![None; closes.len()];
    if closes.len() <= period {
        return Ok(values);
    }

    let n = period as f64;
    let (mut avg_gain, mut avg_loss) =
        closes[..=period]
            .windows(2)
            .fold((0.0, 0.0), |(g, l), w| split_change(w[1] - w[0], g, l));
    avg_gain /= n;
    avg_loss /= n;
    values[period] = Some(index_from(avg_gain, avg_loss));

    for i in (period + 1)..closes.len() {
        let (gain, loss) = split_change(closes[i] - closes[i - 1], 0.0, 0.0);
        avg_gain = (avg_gain * (n - 1.0) + gain) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss) / n;
        values[i] = Some(index_from(avg_gain, avg_loss));
    }

    Ok(values)
}

fn split_change(change: f64, gain: f64, loss: f64) -> (f64, f64) {
    if change > 0.0 {
        (gain + change, loss)
    } else {
        (gain, loss - change)
    }
}

fn index_from(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
