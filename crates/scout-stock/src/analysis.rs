//! Detailed per-symbol analysis
//!
//! Each subject gets the longer analysis history, its fundamentals, the
//! latest indicator readings, exit levels and a chart window. A subject whose
//! price data cannot be fetched is skipped; the others still get analysed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::api::MarketDataProvider;
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use crate::indicators::IndicatorEngine;
use crate::model::{Fundamentals, Symbol};
use crate::period::Period;
use crate::prompts::Language;
use crate::risk::{RiskCalculator, RiskParameters};

/// Direction of the latest close relative to the SMA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
    /// Not enough history for the SMA
    Undetermined,
}

impl Trend {
    pub fn from_close(close: f64, sma: Option<f64>) -> Self {
        match sma {
            Some(sma) if close > sma => Trend::Bullish,
            Some(_) => Trend::Bearish,
            None => Trend::Undetermined,
        }
    }

    pub fn label(self, language: Language) -> &'static str {
        match (language, self) {
            (Language::English, Trend::Bullish) => "Bullish",
            (Language::English, Trend::Bearish) => "Bearish",
            (Language::English, Trend::Undetermined) => "Undetermined",
            (Language::TraditionalChinese, Trend::Bullish) => "多頭",
            (Language::TraditionalChinese, Trend::Bearish) => "空頭",
            (Language::TraditionalChinese, Trend::Undetermined) => "未定",
        }
    }
}

/// One point of the close/SMA chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub sma: Option<f64>,
}

/// Everything known about one symbol at its latest bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolAnalysis {
    pub symbol: Symbol,
    pub as_of: NaiveDate,
    pub close: f64,
    pub rsi: Option<f64>,
    pub sma: Option<f64>,
    pub atr: Option<f64>,
    pub trend: Trend,
    /// `None` while ATR is undefined
    pub risk: Option<RiskParameters>,
    pub fundamentals: Fundamentals,
    /// Oldest first, at most `chart_window` points
    pub chart: Vec<ChartPoint>,
}

/// Analyses of a subject list, plus the subjects that had to be skipped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisBatch {
    pub analyses: Vec<SymbolAnalysis>,
    pub failed: Vec<(Symbol, String)>,
}

impl AnalysisBatch {
    pub fn symbols(&self) -> Vec<&Symbol> {
        self.analyses.iter().map(|a| &a.symbol).collect()
    }
}

/// Runs the fetch, indicator and risk steps for subject symbols
pub struct Analyzer {
    provider: Arc<dyn MarketDataProvider>,
    engine: IndicatorEngine,
    risk: RiskCalculator,
    range: Period,
    chart_window: usize,
}

impl Analyzer {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: &StockConfig) -> Self {
        Self {
            provider,
            engine: IndicatorEngine::new(&config.indicators),
            risk: RiskCalculator::new(&config.risk),
            range: config.analysis_range,
            chart_window: config.chart_window,
        }
    }

    /// Analyse one symbol. Missing fundamentals are tolerated; missing prices are not.
    #[instrument(skip_all, fields(symbol = %symbol))]
    pub async fn analyze(&self, symbol: &Symbol) -> Result<SymbolAnalysis> {
        let series = self.provider.price_history(symbol, self.range).await?;

        let Some(last) = series.last().copied() else {
            return Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("no price bars for {}", self.range),
            });
        };

        let fundamentals = match self.provider.fundamentals(symbol).await {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "Fundamentals unavailable");
                Fundamentals::unavailable()
            }
        };

        let indicators = self.engine.compute(&series)?;
        let latest = indicators.latest();

        let chart_start = series.len().saturating_sub(self.chart_window);
        let chart = series.bars()[chart_start..]
            .iter()
            .zip(&indicators.sma[chart_start..])
            .map(|(bar, sma)| ChartPoint {
                date: bar.date,
                close: bar.close,
                sma: *sma,
            })
            .collect();

        Ok(SymbolAnalysis {
            symbol: symbol.clone(),
            as_of: last.date,
            close: last.close,
            rsi: latest.rsi,
            sma: latest.sma,
            atr: latest.atr,
            trend: Trend::from_close(last.close, latest.sma),
            risk: latest.atr.map(|atr| self.risk.compute(last.close, atr)),
            fundamentals,
            chart,
        })
    }

    /// Analyse every subject in order, skipping failures.
    ///
    /// Fails only when no subject could be analysed.
    pub async fn analyze_all(&self, symbols: &[Symbol]) -> Result<AnalysisBatch> {
        let mut batch = AnalysisBatch::default();

        for symbol in symbols {
            match self.analyze(symbol).await {
                Ok(analysis) => batch.analyses.push(analysis),
                Err(e) => {
                    warn!(%symbol, error = %e, "Skipping symbol: analysis failed");
                    batch.failed.push((symbol.clone(), e.to_string()));
                }
            }
        }

        if batch.analyses.is_empty() {
            return Err(StockError::NoSymbolsAnalyzed {
                requested: symbols.len(),
            });
        }

        info!(
            analysed = batch.analyses.len(),
            failed = batch.failed.len(),
            "Analysis complete"
        );
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketDataProvider;
    use crate::indicators::test_support::series_from_closes;
    use crate::model::PriceSeries;

    fn symbol(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    fn analyzer(mock: MockMarketDataProvider) -> Analyzer {
        Analyzer::new(Arc::new(mock), &StockConfig::default())
    }

    #[test]
    fn test_trend_from_close() {
        assert_eq!(Trend::from_close(105.0, Some(100.0)), Trend::Bullish);
        assert_eq!(Trend::from_close(100.0, Some(100.0)), Trend::Bearish);
        assert_eq!(Trend::from_close(95.0, Some(100.0)), Trend::Bearish);
        assert_eq!(Trend::from_close(95.0, None), Trend::Undetermined);
        assert_eq!(Trend::Bullish.label(Language::TraditionalChinese), "多頭");
        assert_eq!(Trend::Bearish.label(Language::English), "Bearish");
    }

    #[tokio::test]
    async fn test_analyze_rising_series() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_price_history()
            .returning(|s, _| Ok(series_from_closes(s.as_str(), &rising(80))));
        mock.expect_fundamentals().returning(|_| {
            Ok(Fundamentals {
                trailing_pe: Some(18.5),
                price_to_book: Some(4.2),
                revenue_growth: Some(0.3),
            })
        });

        let analysis = analyzer(mock).analyze(&symbol("2330.TW")).await.unwrap();

        assert_eq!(analysis.close, 179.0);
        assert_eq!(analysis.trend, Trend::Bullish);
        // constant true range of 2 (high/low at +-1 around a +1 step)
        let atr = analysis.atr.unwrap();
        assert!((atr - 2.0).abs() < 1e-9);
        let risk = analysis.risk.unwrap();
        assert!((risk.stop_loss - 175.0).abs() < 1e-9);
        assert!((risk.take_profit - 187.0).abs() < 1e-9);
        assert_eq!(analysis.chart.len(), 60);
        assert_eq!(analysis.chart.last().unwrap().close, 179.0);
        assert_eq!(analysis.fundamentals.trailing_pe, Some(18.5));
    }

    #[tokio::test]
    async fn test_short_series_has_no_risk_or_trend() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_price_history()
            .returning(|s, _| Ok(series_from_closes(s.as_str(), &rising(10))));
        mock.expect_fundamentals()
            .returning(|_| Ok(Fundamentals::unavailable()));

        let analysis = analyzer(mock).analyze(&symbol("2330.TW")).await.unwrap();

        assert_eq!(analysis.trend, Trend::Undetermined);
        assert!(analysis.rsi.is_none());
        assert!(analysis.risk.is_none());
        assert_eq!(analysis.chart.len(), 10);
        assert!(analysis.chart.iter().all(|p| p.sma.is_none()));
    }

    #[tokio::test]
    async fn test_fundamentals_failure_is_tolerated() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_price_history()
            .returning(|s, _| Ok(series_from_closes(s.as_str(), &rising(30))));
        mock.expect_fundamentals()
            .returning(|_| Err(StockError::YahooFinanceError("401".into())));

        let analysis = analyzer(mock).analyze(&symbol("2330.TW")).await.unwrap();
        assert!(analysis.fundamentals.is_empty());
    }

    #[tokio::test]
    async fn test_empty_series_is_unavailable() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_price_history()
            .returning(|s, _| Ok(PriceSeries::empty(s.clone())));

        let err = analyzer(mock).analyze(&symbol("9999.TW")).await.unwrap_err();
        assert!(matches!(err, StockError::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_analyze_all_skips_failures() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_price_history().returning(|s, _| {
            if s.as_str() == "2317.TW" {
                Err(StockError::YahooFinanceError("timeout".into()))
            } else {
                Ok(series_from_closes(s.as_str(), &rising(30)))
            }
        });
        mock.expect_fundamentals()
            .returning(|_| Ok(Fundamentals::unavailable()));

        let subjects = [symbol("2330.TW"), symbol("2317.TW"), symbol("2454.TW")];
        let batch = analyzer(mock).analyze_all(&subjects).await.unwrap();

        assert_eq!(batch.analyses.len(), 2);
        assert_eq!(batch.failed.len(), 1);
        assert_eq!(batch.failed[0].0, subjects[1]);
    }

    #[tokio::test]
    async fn test_analyze_all_fails_when_nothing_succeeds() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_price_history()
            .returning(|_, _| Err(StockError::YahooFinanceError("down".into())));

        let err = analyzer(mock)
            .analyze_all(&[symbol("2330.TW")])
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::NoSymbolsAnalyzed { requested: 1 }));
    }
}
