//! Yahoo Finance client

use crate::error::{Result, StockError};
use crate::model::{Fundamentals, PriceBar, PriceSeries, Symbol};
use crate::period::Period;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use yahoo_finance_api as yahoo;

use super::MarketDataProvider;

const USER_AGENT: &str = concat!("stock-scout/", env!("CARGO_PKG_VERSION"));

/// Yahoo Finance client for daily bars and valuation ratios
pub struct YahooFinanceClient {
    timeout: Duration,
    /// Quote-summary requests need a cookie and crumb, which the connector
    /// fetches once and refreshes when Yahoo rejects them.
    session: Mutex<yahoo::YahooConnector>,
}

impl fmt::Debug for YahooFinanceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YahooFinanceClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl YahooFinanceClient {
    /// Create a client whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            timeout,
            session: Mutex::new(connector(timeout)?),
        })
    }

    /// Daily bars between two instants
    pub async fn get_historical_quotes(
        &self,
        symbol: &Symbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let provider = connector(self.timeout)?;

        // Convert chrono DateTime to time OffsetDateTime
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp()).map_err(|e| {
            StockError::YahooFinanceError(format!("Invalid start timestamp: {e}"))
        })?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| StockError::YahooFinanceError(format!("Invalid end timestamp: {e}")))?;

        let response = provider
            .get_quote_history(symbol.as_str(), start_odt, end_odt)
            .await?;
        let quotes = response.quotes()?;

        let bars = quotes
            .iter()
            .filter(|q| q.close.is_finite() && q.close > 0.0)
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(PriceBar {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                })
            })
            .collect();

        Ok(PriceSeries::new(symbol.clone(), bars))
    }
}

fn connector(timeout: Duration) -> Result<yahoo::YahooConnector> {
    Ok(yahoo::YahooConnector::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    #[instrument(skip_all, fields(symbol = %symbol, period = %period))]
    async fn price_history(&self, symbol: &Symbol, period: Period) -> Result<PriceSeries> {
        let end = Utc::now();
        let series = self
            .get_historical_quotes(symbol, period.start_from(end), end)
            .await?;
        debug!(bars = series.len(), "Fetched price history");
        Ok(series)
    }

    #[instrument(skip_all, fields(symbol = %symbol))]
    async fn fundamentals(&self, symbol: &Symbol) -> Result<Fundamentals> {
        let summary = self
            .session
            .lock()
            .await
            .get_ticker_info(symbol.as_str())
            .await?;
        let fundamentals = fundamentals_from_summary(&summary)?;
        debug!(?fundamentals, "Fetched fundamentals");
        Ok(fundamentals)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

/// Pull the three valuation ratios out of a quote summary.
///
/// An error payload is an error; a result with missing modules or fields
/// yields `None` for those ratios.
pub fn fundamentals_from_summary(summary: &yahoo::YQuoteSummary) -> Result<Fundamentals> {
    let error = summary
        .finance
        .as_ref()
        .and_then(|f| f.error.as_ref())
        .or_else(|| summary.quote_summary.as_ref()?.error.as_ref());
    if let Some(error) = error {
        return Err(StockError::YahooFinanceError(format!(
            "quoteSummary: {}",
            error
                .description
                .as_deref()
                .or(error.code.as_deref())
                .unwrap_or("unknown error")
        )));
    }

    let Some(data) = summary
        .quote_summary
        .as_ref()
        .and_then(|q| q.result.as_ref())
        .and_then(|r| r.first())
    else {
        return Ok(Fundamentals::unavailable());
    };

    let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
    Ok(Fundamentals {
        trailing_pe: finite(data.summary_detail.as_ref().and_then(|d| d.trailing_pe)),
        price_to_book: finite(
            data.default_key_statistics
                .as_ref()
                .and_then(|s| s.price_to_book),
        ),
        revenue_growth: finite(data.financial_data.as_ref().and_then(|f| f.revenue_growth)),
    })
}
