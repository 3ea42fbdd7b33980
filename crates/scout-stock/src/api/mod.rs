//! Market-data collaborators

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Fundamentals, PriceSeries, Symbol};
use crate::period::Period;

/// Source of daily price history and valuation snapshots.
///
/// Errors are opaque to callers: the screener and analyzer log them and move
/// on to the next symbol.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars covering `period` up to now; may be empty
    async fn price_history(&self, symbol: &Symbol, period: Period) -> Result<PriceSeries>;

    /// Valuation snapshot; missing fields are `None`
    async fn fundamentals(&self, symbol: &Symbol) -> Result<Fundamentals>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
