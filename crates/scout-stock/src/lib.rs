//! Stock screening and commentary for Taiwan-listed equities
//!
//! This crate provides the domain logic behind the `stock-scout` binary:
//!
//! - Market data from Yahoo Finance (daily bars and valuation snapshots)
//! - Indicator engine: Wilder RSI, SMA and Wilder ATR aligned per bar
//! - Momentum screener over the TW-50 universe with fallback subjects
//! - ATR-scaled stop-loss and take-profit levels
//! - Bilingual numeric summary and Gemini commentary prompts
//! - Markdown report assembly
//!
//! # Architecture
//!
//! A [`Scout`] runs exactly one [`Trigger`] per call:
//! - `Trigger::Manual`: analyse the symbols the user typed
//! - `Trigger::Scan`: screen a sample of the universe, then analyse the shortlist
//!
//! Per-symbol failures are logged and skipped. Commentary failures become
//! [`Commentary::Unavailable`] and the report shows a placeholder.
//!
//! # Example
//!
//! ```rust,ignore
//! use scout_stock::{Scout, StockConfig, Trigger};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockConfig::builder().with_env().build()?;
//!     let scout = Scout::with_yahoo(config, None)?;
//!
//!     let subjects = scout.parse_tickers("2330, 2317")?;
//!     let outcome = scout.run(Trigger::Manual(subjects)).await?;
//!     println!("{}", outcome.report.render());
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod cache;
pub mod commentary;
pub mod config;
pub mod error;
pub mod indicators;
pub mod model;
pub mod period;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod risk;
pub mod screener;
pub mod summary;
pub mod universe;

// Re-export main types for convenience
pub use analysis::{AnalysisBatch, Analyzer, ChartPoint, SymbolAnalysis, Trend};
pub use api::{MarketDataProvider, YahooFinanceClient};
pub use cache::CachedMarketData;
pub use commentary::{Commentaries, Commentary, CommentaryWriter};
pub use config::{IndicatorConfig, RiskConfig, Sampling, ScreeningConfig, StockConfig};
pub use error::{Result, StockError};
pub use indicators::{IndicatorEngine, IndicatorSet, LatestIndicators};
pub use model::{Fundamentals, PriceBar, PriceSeries, Symbol};
pub use period::Period;
pub use pipeline::{RunOutcome, Scout, Trigger};
pub use prompts::{Language, PromptKind, PromptSet};
pub use report::Report;
pub use risk::{RiskCalculator, RiskParameters};
pub use screener::{Candidate, Screener, ScreeningResult, ScreeningRule, SkipReason};
