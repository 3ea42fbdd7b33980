//! Simple moving average

use ta::Next;
use ta::indicators::SimpleMovingAverage;

use crate::error::{Result, StockError};

/// Mean of the last `period` closes; `None` until `period` bars exist.
pub fn sma(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let mut indicator =
        SimpleMovingAverage::new(period).map_err(|e| StockError::IndicatorError(e.to_string()))?;

    Ok(closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let value = indicator.next(close);
            (i + 1 >= period).then_some(value)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_before_window() {
        let closes: Vec<f64> = (1..=25).map(f64::from).collect();
        let values = sma(&closes, 20).unwrap();

        assert!(values[..19].iter().all(Option::is_none));
        assert!(values[19..].iter().all(Option::is_some));
    }

    #[test]
    fn test_last_value_is_mean_of_window() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + f64::from(i * i % 17)).collect();
        let values = sma(&closes, 20).unwrap();

        let expected = closes[20..].iter().sum::<f64>() / 20.0;
        let actual = values.last().copied().flatten().unwrap();
        assert!((actual - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(matches!(sma(&[1.0], 0), Err(StockError::IndicatorError(_))));
    }
}
