//! Indicator engine: RSI, SMA and ATR aligned bar-for-bar with a price series
//!
//! Every indicator returns one `Option<f64>` per bar. Leading bars without
//! enough history are `None` rather than a numeric stand-in, so "undefined"
//! never leaks into a comparison as zero.

mod atr;
mod rsi;
mod sma;

pub use atr::{atr, true_range};
pub use rsi::rsi;
pub use sma::sma;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::IndicatorConfig;
use crate::error::Result;
use crate::model::PriceSeries;

/// Per-bar indicator values for one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub dates: Vec<NaiveDate>,
    pub rsi: Vec<Option<f64>>,
    pub sma: Vec<Option<f64>>,
    pub atr: Vec<Option<f64>>,
}

/// Indicator values at the most recent bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestIndicators {
    pub rsi: Option<f64>,
    pub sma: Option<f64>,
    pub atr: Option<f64>,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn latest(&self) -> LatestIndicators {
        LatestIndicators {
            rsi: self.rsi.last().copied().flatten(),
            sma: self.sma.last().copied().flatten(),
            atr: self.atr.last().copied().flatten(),
        }
    }
}

/// Computes the configured indicator periods over a series
#[derive(Debug, Clone, Copy)]
pub struct IndicatorEngine {
    rsi_period: usize,
    sma_period: usize,
    atr_period: usize,
}

impl IndicatorEngine {
    pub fn new(config: &IndicatorConfig) -> Self {
        Self {
            rsi_period: config.rsi_period,
            sma_period: config.sma_period,
            atr_period: config.atr_period,
        }
    }

    pub fn compute(&self, series: &PriceSeries) -> Result<IndicatorSet> {
        let closes = series.closes();
        Ok(IndicatorSet {
            dates: series.bars().iter().map(|b| b.date).collect(),
            rsi: rsi(&closes, self.rsi_period)?,
            sma: sma(&closes, self.sma_period)?,
            atr: atr(series.bars(), self.atr_period)?,
        })
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new(&IndicatorConfig::default())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::{PriceBar, PriceSeries, Symbol};
    use chrono::{Duration, NaiveDate};

    /// Bars with the given closes, one per calendar day, high/low at +-1
    pub fn series_from_closes(symbol: &str, closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 10_000,
            })
            .collect();
        PriceSeries::new(Symbol::new(symbol).unwrap(), bars)
    }
}
