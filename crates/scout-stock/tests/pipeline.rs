//! End-to-end runs against in-memory market data and a scripted model

use async_trait::async_trait;
use chrono::{Duration as Days, NaiveDate};
use scout_llm::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, StopReason, TokenUsage,
};
use scout_stock::{
    Fundamentals, Language, MarketDataProvider, Period, PriceBar, PriceSeries, Sampling, Scout,
    StockConfig, StockError, Symbol, Trigger,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Serves fixed series; symbols without one fail like an unknown ticker
#[derive(Default)]
struct FakeMarket {
    series: HashMap<String, Vec<PriceBar>>,
    calls: AtomicUsize,
}

impl FakeMarket {
    fn with(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.series.insert(symbol.to_string(), bars);
        self
    }
}

#[async_trait]
impl MarketDataProvider for FakeMarket {
    async fn price_history(
        &self,
        symbol: &Symbol,
        _period: Period,
    ) -> scout_stock::Result<PriceSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.series
            .get(symbol.as_str())
            .map(|bars| PriceSeries::new(symbol.clone(), bars.clone()))
            .ok_or_else(|| StockError::YahooFinanceError(format!("No data found for {symbol}")))
    }

    async fn fundamentals(&self, _symbol: &Symbol) -> scout_stock::Result<Fundamentals> {
        Ok(Fundamentals {
            trailing_pe: Some(15.0),
            price_to_book: Some(2.0),
            revenue_growth: None,
        })
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Echoes a fixed answer, or fails every request
struct ScriptedModel {
    answer: Option<&'static str>,
}

#[async_trait]
impl LLMProvider for ScriptedModel {
    async fn complete(&self, _request: CompletionRequest) -> scout_llm::Result<CompletionResponse> {
        match self.answer {
            Some(text) => Ok(CompletionResponse {
                message: Message::assistant(text),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            }),
            None => Err(LLMError::ServiceUnavailable("busy".to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Daily bars with true range fixed at 2 for steps below 1.5
fn bars(closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + Days::days(i as i64),
            open: close,
            high: close + 0.5,
            low: close - 1.5,
            close,
            volume: 1_000,
        })
        .collect()
}

/// 30 closes rising evenly from 100 to 130
fn rising_to_130() -> Vec<f64> {
    (0..30).map(|i| 100.0 + 30.0 * f64::from(i) / 29.0).collect()
}

/// Alternating +2 / -1.5 moves: close above SMA20 with RSI near 60
fn steady_climb() -> Vec<f64> {
    let mut closes = vec![100.0];
    for i in 1..22 {
        let last = closes[i - 1];
        closes.push(if i % 2 == 1 { last + 2.0 } else { last - 1.5 });
    }
    closes
}

fn falling() -> Vec<f64> {
    (0..30).map(|i| 150.0 - f64::from(i)).collect()
}

fn config(language: Language, universe: &[&str]) -> StockConfig {
    let mut config = StockConfig::builder()
        .language(language)
        .sampling(Sampling::All)
        .build()
        .unwrap();
    config.screening.universe = universe.iter().map(|s| Symbol::new(s).unwrap()).collect();
    config.screening.pause = Duration::ZERO;
    config
}

#[tokio::test]
async fn rising_series_gets_atr_scaled_levels() {
    let market = FakeMarket::default().with("2330.TW", bars(&rising_to_130()));
    let scout = Scout::new(
        config(Language::English, &["2330.TW"]),
        Arc::new(market),
        None,
    )
    .unwrap();

    let subjects = scout.parse_tickers("2330").unwrap();
    let outcome = scout.run(Trigger::Manual(subjects)).await.unwrap();

    let analysis = &outcome.batch.analyses[0];
    let last = analysis.close;
    assert!((last - 130.0).abs() < 1e-9);
    assert!((analysis.atr.unwrap() - 2.0).abs() < 1e-9);

    let risk = analysis.risk.unwrap();
    assert!((risk.stop_loss - (last - 4.0)).abs() < 1e-9);
    assert!((risk.take_profit - (last + 8.0)).abs() < 1e-9);
    assert!(outcome.summary.contains("Suggested stop-loss: 126.00"));
    assert!(outcome.summary.contains("Suggested take-profit: 138.00"));
}

#[tokio::test]
async fn one_failed_fetch_leaves_two_in_summary() {
    let market = FakeMarket::default()
        .with("2330.TW", bars(&rising_to_130()))
        .with("2454.TW", bars(&falling()));
    let scout = Scout::new(
        config(Language::TraditionalChinese, &["2330.TW"]),
        Arc::new(market),
        None,
    )
    .unwrap();

    let subjects = scout.parse_tickers("2330, 2317, 2454").unwrap();
    let outcome = scout.run(Trigger::Manual(subjects)).await.unwrap();

    assert_eq!(outcome.summary.matches("股票: ").count(), 2);
    assert!(outcome.summary.contains("2330.TW"));
    assert!(outcome.summary.contains("2454.TW"));
    assert!(!outcome.summary.contains("2317.TW"));
    assert_eq!(outcome.batch.failed.len(), 1);
}

#[tokio::test]
async fn malformed_ticker_does_not_abort_manual_run() {
    let market = FakeMarket::default().with("2330.TW", bars(&rising_to_130()));
    let scout = Scout::new(
        config(Language::TraditionalChinese, &["2330.TW"]),
        Arc::new(market),
        None,
    )
    .unwrap();

    let subjects = scout.parse_tickers("2330, 台積電").unwrap();
    assert_eq!(subjects, vec![Symbol::new("2330.TW").unwrap()]);

    let outcome = scout.run(Trigger::Manual(subjects)).await.unwrap();
    assert_eq!(outcome.batch.analyses.len(), 1);
    assert!(outcome.summary.contains("2330.TW"));

    assert!(matches!(
        scout.parse_tickers("台積電"),
        Err(StockError::InvalidSymbol(_))
    ));
}

#[tokio::test]
async fn scan_shortlists_in_scan_order_and_reports_once() {
    let universe = ["1101.TW", "1216.TW", "1301.TW", "1303.TW", "2330.TW", "2454.TW"];
    let mut market = FakeMarket::default();
    for symbol in &universe[..5] {
        market = market.with(symbol, bars(&steady_climb()));
    }
    market = market.with("2454.TW", bars(&falling()));
    let market = Arc::new(market);

    let scout = Scout::new(
        config(Language::TraditionalChinese, &universe),
        market.clone(),
        Some(Arc::new(ScriptedModel {
            answer: Some("推薦 1101.TW"),
        })),
    )
    .unwrap();

    let outcome = scout.run(Trigger::Scan).await.unwrap();
    let screening = outcome.screening.as_ref().unwrap();

    assert_eq!(screening.passed.len(), 5);
    let selected: Vec<&str> = screening.selected.iter().map(Symbol::as_str).collect();
    assert_eq!(selected, ["1101.TW", "1216.TW", "1301.TW", "1303.TW"]);

    let rendered = outcome.report.render();
    let header = rendered
        .lines()
        .find_map(|line| line.strip_prefix("**分析標的**: "))
        .unwrap();
    assert_eq!(header, "1101.TW, 1216.TW, 1301.TW, 1303.TW");
    for symbol in &selected {
        assert_eq!(header.matches(symbol).count(), 1);
    }
    assert!(rendered.contains("推薦 1101.TW"));

    // six scan fetches plus four analysis fetches
    assert_eq!(market.calls.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn empty_scan_falls_back_to_default_pair() {
    let market = FakeMarket::default()
        .with("2454.TW", bars(&falling()))
        .with("2330.TW", bars(&falling()))
        .with("2317.TW", bars(&falling()));
    let scout = Scout::new(
        config(Language::English, &["2454.TW"]),
        Arc::new(market),
        None,
    )
    .unwrap();

    let outcome = scout.run(Trigger::Scan).await.unwrap();
    let screening = outcome.screening.unwrap();

    assert!(screening.used_fallback);
    let selected: Vec<&str> = screening.selected.iter().map(Symbol::as_str).collect();
    assert_eq!(selected, ["2330.TW", "2317.TW"]);
    assert_eq!(outcome.batch.analyses.len(), 2);
}

#[tokio::test]
async fn model_outage_uses_placeholders() {
    let market = FakeMarket::default().with("2330.TW", bars(&rising_to_130()));
    let scout = Scout::new(
        config(Language::TraditionalChinese, &["2330.TW"]),
        Arc::new(market),
        Some(Arc::new(ScriptedModel { answer: None })),
    )
    .unwrap();

    let subjects = scout.parse_tickers("2330").unwrap();
    let outcome = scout.run(Trigger::Manual(subjects)).await.unwrap();

    assert!(!outcome.commentaries.ranking.is_generated());
    let rendered = outcome.report.render();
    assert!(rendered.contains("分析暫時無法生成"));
    assert!(rendered.contains("建議暫時無法生成"));
}

#[tokio::test]
async fn report_file_round_trip() {
    let market = FakeMarket::default().with("2330.TW", bars(&rising_to_130()));
    let scout = Scout::new(
        config(Language::English, &["2330.TW"]),
        Arc::new(market),
        None,
    )
    .unwrap();

    let subjects = scout.parse_tickers("2330, 2330.TW").unwrap();
    let outcome = scout.run(Trigger::Manual(subjects)).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = outcome.report.write_to(dir.path()).unwrap();
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("Stock_Report_") && name.ends_with(".md"));

    let written = std::fs::read_to_string(&path).unwrap();
    let header = written
        .lines()
        .find_map(|line| line.strip_prefix("**Subjects**: "))
        .unwrap();
    assert_eq!(header, "2330.TW");
}
