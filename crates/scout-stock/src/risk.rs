//! Volatility-scaled stop-loss and take-profit levels

use serde::{Deserialize, Serialize};

use crate::config::RiskConfig;

/// Exit levels for one symbol at the latest bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskParameters {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Places stops at `close - stop_multiplier * ATR` and targets at
/// `close + target_multiplier * ATR`.
///
/// Levels are not clamped: a low-priced, volatile stock can get a negative stop.
#[derive(Debug, Clone, Copy)]
pub struct RiskCalculator {
    stop_multiplier: f64,
    target_multiplier: f64,
}

impl RiskCalculator {
    pub fn new(config: &RiskConfig) -> Self {
        Self {
            stop_multiplier: config.stop_multiplier,
            target_multiplier: config.target_multiplier,
        }
    }

    pub fn compute(&self, close: f64, atr: f64) -> RiskParameters {
        RiskParameters {
            stop_loss: close - self.stop_multiplier * atr,
            take_profit: close + self.target_multiplier * atr,
        }
    }
}

impl Default for RiskCalculator {
    fn default() -> Self {
        Self::new(&RiskConfig::default())
    }
}
