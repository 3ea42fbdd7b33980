//! Momentum screener over a sampled universe
//!
//! A symbol is shortlisted when its latest close sits above the SMA and its
//! RSI is inside an exclusive band (45, 65 by default). Symbols are fetched
//! one at a time, spaced by a rate limiter; any fetch failure skips the
//! symbol and the scan carries on.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::MarketDataProvider;
use crate::config::{Sampling, ScreeningConfig, StockConfig};
use crate::indicators::IndicatorEngine;
use crate::model::Symbol;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Inclusion rule: `close > sma && lower < rsi < upper`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreeningRule {
    pub rsi_lower: f64,
    pub rsi_upper: f64,
}

impl ScreeningRule {
    /// Undefined indicators never pass.
    pub fn passes(&self, close: f64, sma: Option<f64>, rsi: Option<f64>) -> bool {
        match (sma, rsi) {
            (Some(sma), Some(rsi)) => close > sma && self.rsi_lower < rsi && rsi < self.rsi_upper,
            _ => false,
        }
    }
}

/// A symbol that passed the rule, with the values it was judged on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: Symbol,
    pub close: f64,
    pub sma: f64,
    pub rsi: f64,
}

/// Why a sampled symbol did not make the shortlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    FetchFailed(String),
    IndicatorFailed(String),
    InsufficientHistory { bars: usize },
    Rejected {
        close: f64,
        sma: Option<f64>,
        rsi: Option<f64>,
    },
}

/// Result of evaluating one symbol
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Passed(Candidate),
    Skipped(SkipReason),
}

/// Outcome of one scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResult {
    /// Symbols scanned, in scan order
    pub sampled: Vec<Symbol>,
    /// Every symbol that passed, in scan order
    pub passed: Vec<Candidate>,
    /// Symbols that did not pass and why
    pub skipped: Vec<(Symbol, SkipReason)>,
    /// Subjects for detailed analysis: the first `max_picks` passes, or the fallback
    pub selected: Vec<Symbol>,
    /// Whether `selected` is the fallback list
    pub used_fallback: bool,
}

/// Scans a universe for momentum candidates
pub struct Screener {
    provider: Arc<dyn MarketDataProvider>,
    config: ScreeningConfig,
    engine: IndicatorEngine,
    rate_limiter: Option<SharedRateLimiter>,
}

impl Screener {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: &StockConfig) -> Self {
        let rate_limiter = Quota::with_period(config.screening.pause)
            .map(|quota| Arc::new(RateLimiter::direct(quota)));

        Self {
            provider,
            config: config.screening.clone(),
            engine: IndicatorEngine::new(&config.indicators),
            rate_limiter,
        }
    }

    pub fn rule(&self) -> ScreeningRule {
        ScreeningRule {
            rsi_lower: self.config.rsi_lower,
            rsi_upper: self.config.rsi_upper,
        }
    }

    /// Pick the symbols to scan according to the sampling strategy
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Symbol> {
        let universe = &self.config.universe;
        match self.config.sampling {
            Sampling::Random { size } => universe
                .choose_multiple(rng, size.min(universe.len()))
                .cloned()
                .collect(),
            Sampling::Leading { size } => universe.iter().take(size).cloned().collect(),
            Sampling::All => universe.clone(),
        }
    }

    /// Sample the universe (seeded from config when a seed is set) and scan it
    pub async fn scan(&self) -> ScreeningResult {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let sampled = self.sample(&mut rng);
        self.scan_symbols(sampled).await
    }

    /// Evaluate `symbols` in order and build the shortlist
    pub async fn scan_symbols(&self, symbols: Vec<Symbol>) -> ScreeningResult {
        info!(count = symbols.len(), provider = self.provider.name(), "Scanning symbols");

        let mut passed = Vec::new();
        let mut skipped = Vec::new();

        for symbol in &symbols {
            match self.evaluate(symbol).await {
                Evaluation::Passed(candidate) => {
                    debug!(%symbol, rsi = candidate.rsi, sma = candidate.sma, "Candidate passed");
                    passed.push(candidate);
                }
                Evaluation::Skipped(reason) => {
                    debug!(%symbol, ?reason, "Candidate skipped");
                    skipped.push((symbol.clone(), reason));
                }
            }
        }

        let used_fallback = passed.is_empty();
        let selected = if used_fallback {
            info!("No candidates passed; using fallback symbols");
            self.config.fallback.clone()
        } else {
            passed
                .iter()
                .take(self.config.max_picks)
                .map(|c| c.symbol.clone())
                .collect()
        };

        info!(
            passed = passed.len(),
            skipped = skipped.len(),
            selected = ?selected.iter().map(Symbol::as_str).collect::<Vec<_>>(),
            "Scan complete"
        );

        ScreeningResult {
            sampled: symbols,
            passed,
            skipped,
            selected,
            used_fallback,
        }
    }

    /// Fetch one symbol's recent history and apply the rule
    pub async fn evaluate(&self, symbol: &Symbol) -> Evaluation {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let series = match self
            .provider
            .price_history(symbol, self.config.history_range)
            .await
        {
            Ok(series) => series,
            Err(e) => {
                warn!(%symbol, error = %e, "Skipping symbol: fetch failed");
                return Evaluation::Skipped(SkipReason::FetchFailed(e.to_string()));
            }
        };

        if series.len() < self.config.min_bars {
            return Evaluation::Skipped(SkipReason::InsufficientHistory { bars: series.len() });
        }

        let indicators = match self.engine.compute(&series) {
            Ok(set) => set.latest(),
            Err(e) => {
                warn!(%symbol, error = %e, "Skipping symbol: indicator failure");
                return Evaluation::Skipped(SkipReason::IndicatorFailed(e.to_string()));
            }
        };

        let Some(close) = series.last().map(|b| b.close) else {
            return Evaluation::Skipped(SkipReason::InsufficientHistory { bars: 0 });
        };

        match (indicators.sma, indicators.rsi) {
            (Some(sma), Some(rsi)) if self.rule().passes(close, Some(sma), Some(rsi)) => {
                Evaluation::Passed(Candidate {
                    symbol: symbol.clone(),
                    close,
                    sma,
                    rsi,
                })
            }
            (sma, rsi) => Evaluation::Skipped(SkipReason::Rejected { close, sma, rsi }),
        }
    }
}
