//! One run of the scout: pick subjects, analyse them, comment, report

use scout_llm::LLMProvider;
use std::sync::Arc;
use tracing::info;

use crate::analysis::{AnalysisBatch, Analyzer};
use crate::api::{MarketDataProvider, YahooFinanceClient};
use crate::cache::CachedMarketData;
use crate::commentary::{Commentaries, CommentaryWriter};
use crate::config::StockConfig;
use crate::error::Result;
use crate::model::{Symbol, parse_symbol_list};
use crate::report::Report;
use crate::screener::{Screener, ScreeningResult};
use crate::summary::compose_summary;

/// What chose the subjects of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Symbols entered by the user
    Manual(Vec<Symbol>),
    /// Shortlist from a screening scan
    Scan,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Present for scan-triggered runs
    pub screening: Option<ScreeningResult>,
    /// Symbols handed to the analyzer
    pub subjects: Vec<Symbol>,
    pub batch: AnalysisBatch,
    pub summary: String,
    pub commentaries: Commentaries,
    pub report: Report,
}

/// Wires the screener, analyzer and commentary writer around shared collaborators
pub struct Scout {
    config: StockConfig,
    screener: Screener,
    analyzer: Analyzer,
    writer: CommentaryWriter,
}

impl Scout {
    pub fn new(
        config: StockConfig,
        market: Arc<dyn MarketDataProvider>,
        llm: Option<Arc<dyn LLMProvider>>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            screener: Screener::new(Arc::clone(&market), &config),
            analyzer: Analyzer::new(market, &config),
            writer: CommentaryWriter::new(llm, &config)?,
            config,
        })
    }

    /// Yahoo Finance market data behind the session memo
    pub fn with_yahoo(config: StockConfig, llm: Option<Arc<dyn LLMProvider>>) -> Result<Self> {
        let yahoo = Arc::new(YahooFinanceClient::new(config.request_timeout)?);
        let market = Arc::new(CachedMarketData::new(yahoo, config.cache_ttl));
        Self::new(config, market, llm)
    }

    pub fn config(&self) -> &StockConfig {
        &self.config
    }

    pub fn commentary_enabled(&self) -> bool {
        self.writer.is_enabled()
    }

    /// Parse a comma-separated ticker list with the configured default suffix
    pub fn parse_tickers(&self, input: &str) -> Result<Vec<Symbol>> {
        parse_symbol_list(input, &self.config.default_suffix)
    }

    pub async fn screen(&self) -> ScreeningResult {
        self.screener.scan().await
    }

    /// Execute exactly one trigger end to end
    pub async fn run(&self, trigger: Trigger) -> Result<RunOutcome> {
        let (screening, subjects) = match trigger {
            Trigger::Manual(symbols) => (None, symbols),
            Trigger::Scan => {
                let result = self.screen().await;
                let selected = result.selected.clone();
                (Some(result), selected)
            }
        };

        self.analyze(subjects, screening).await
    }

    /// Analyse subjects chosen elsewhere (e.g. a scan already shown to the user)
    pub async fn analyze(
        &self,
        subjects: Vec<Symbol>,
        screening: Option<ScreeningResult>,
    ) -> Result<RunOutcome> {
        info!(subjects = subjects.len(), "Analysing subjects");

        let batch = self.analyzer.analyze_all(&subjects).await?;
        let summary = compose_summary(&batch.analyses, self.config.language);
        let commentaries = self.writer.write_all(&summary).await;
        let report = Report::new(
            &subjects,
            summary.clone(),
            commentaries.clone(),
            self.config.language,
            self.config.allocation_capital,
        );

        Ok(RunOutcome {
            screening,
            subjects,
            batch,
            summary,
            commentaries,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketDataProvider;
    use crate::config::Sampling;
    use crate::error::StockError;
    use crate::indicators::test_support::series_from_closes;
    use crate::model::Fundamentals;
    use std::time::Duration;

    fn falling(n: usize) -> Vec<f64> {
        (0..n).map(|i| 200.0 - i as f64).collect()
    }

    fn quiet_config() -> StockConfig {
        let mut config = StockConfig::builder()
            .sampling(Sampling::Leading { size: 3 })
            .build()
            .unwrap();
        config.screening.pause = Duration::ZERO;
        config
    }

    fn market() -> Arc<dyn MarketDataProvider> {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_price_history()
            .returning(|s, _| Ok(series_from_closes(s.as_str(), &falling(40))));
        mock.expect_fundamentals()
            .returning(|_| Ok(Fundamentals::unavailable()));
        mock.expect_name().return_const("mock".to_string());
        Arc::new(mock)
    }

    #[tokio::test]
    async fn test_manual_run() {
        let scout = Scout::new(quiet_config(), market(), None).unwrap();
        let subjects = scout.parse_tickers("2330, 2317").unwrap();

        let outcome = scout.run(Trigger::Manual(subjects)).await.unwrap();

        assert!(outcome.screening.is_none());
        assert_eq!(outcome.batch.analyses.len(), 2);
        assert!(outcome.summary.contains("2330.TW"));
        assert!(!outcome.commentaries.ranking.is_generated());
    }

    #[tokio::test]
    async fn test_scan_run_falls_back() {
        // a falling market never passes the rule
        let scout = Scout::new(quiet_config(), market(), None).unwrap();

        let outcome = scout.run(Trigger::Scan).await.unwrap();

        let screening = outcome.screening.unwrap();
        assert!(screening.used_fallback);
        assert_eq!(screening.sampled.len(), 3);
        assert_eq!(outcome.subjects, screening.selected);
        assert_eq!(outcome.report.subjects(), screening.selected.as_slice());
    }

    #[tokio::test]
    async fn test_all_failures_surface() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_price_history()
            .returning(|_, _| Err(StockError::YahooFinanceError("down".into())));
        let scout = Scout::new(quiet_config(), Arc::new(mock), None).unwrap();

        let subjects = scout.parse_tickers("2330").unwrap();
        let err = scout.run(Trigger::Manual(subjects)).await.unwrap_err();
        assert!(matches!(err, StockError::NoSymbolsAnalyzed { requested: 1 }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = quiet_config();
        config.screening.max_picks = 0;
        assert!(Scout::new(config, market(), None).is_err());
    }
}
