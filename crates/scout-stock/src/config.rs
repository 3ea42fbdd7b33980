//! Configuration for screening, analysis and commentary

use crate::error::{Result, StockError};
use crate::model::{DEFAULT_EXCHANGE_SUFFIX, Symbol};
use crate::period::Period;
use crate::prompts::Language;
use crate::universe;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding the generation model
pub const MODEL_ENV: &str = "SCOUT_MODEL";

/// Environment variable overriding the output language
pub const LANGUAGE_ENV: &str = "SCOUT_LANGUAGE";

/// Symbols drawn per scan unless configured otherwise
pub const DEFAULT_SAMPLE_SIZE: usize = 15;

/// How the screener picks symbols from its universe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Sampling {
    /// A random subset of `size` symbols, scanned in draw order
    Random { size: usize },
    /// The first `size` symbols of the universe
    Leading { size: usize },
    /// Every symbol in the universe
    All,
}

impl Sampling {
    fn size(self) -> Option<usize> {
        match self {
            Sampling::Random { size } | Sampling::Leading { size } => Some(size),
            Sampling::All => None,
        }
    }
}

impl Default for Sampling {
    fn default() -> Self {
        Self::Random {
            size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

/// Screening rule and scan limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    /// Candidate universe
    pub universe: Vec<Symbol>,

    /// Sampling strategy bounding external calls per scan
    pub sampling: Sampling,

    /// Seed for random sampling; `None` draws from entropy
    pub seed: Option<u64>,

    /// History fetched per candidate
    pub history_range: Period,

    /// Candidates with fewer bars are skipped
    pub min_bars: usize,

    /// Exclusive lower RSI bound
    pub rsi_lower: f64,

    /// Exclusive upper RSI bound
    pub rsi_upper: f64,

    /// Shortlist length cap
    pub max_picks: usize,

    /// Subjects used when nothing passes
    pub fallback: Vec<Symbol>,

    /// Minimum spacing between external calls during a scan
    pub pause: Duration,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            universe: universe::tw50(),
            sampling: Sampling::default(),
            seed: None,
            history_range: Period::OneMonth,
            min_bars: 15,
            rsi_lower: 45.0,
            rsi_upper: 65.0,
            max_picks: 4,
            fallback: universe::fallback(),
            pause: Duration::from_millis(300),
        }
    }
}

/// Indicator look-back periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub sma_period: usize,
    pub atr_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            sma_period: 20,
            atr_period: 14,
        }
    }
}

/// ATR multiples for stop-loss and take-profit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub stop_multiplier: f64,
    pub target_multiplier: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            stop_multiplier: 2.0,
            target_multiplier: 4.0,
        }
    }
}

/// Configuration for a stock-scout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Generation model identifier
    pub model: String,

    /// Maximum tokens per generated commentary
    pub max_tokens: usize,

    /// Sampling temperature for commentary
    pub temperature: f32,

    /// Language for prompts, summary and report
    pub language: Language,

    /// Capital the allocation commentary plans for, in TWD
    pub allocation_capital: u64,

    /// Suffix for manually entered codes without an exchange
    pub default_suffix: String,

    /// History fetched for detailed analysis
    pub analysis_range: Period,

    /// Bars kept for the price/SMA chart
    pub chart_window: usize,

    /// Lifetime of memoised market data within a session
    pub cache_ttl: Duration,

    /// Timeout for each Yahoo Finance request
    pub request_timeout: Duration,

    /// Timeout for each commentary generation request
    pub commentary_timeout: Duration,

    pub screening: ScreeningConfig,
    pub indicators: IndicatorConfig,
    pub risk: RiskConfig,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            max_tokens: 8192,
            temperature: 0.7,
            language: Language::default(),
            allocation_capital: 1_000_000,
            default_suffix: DEFAULT_EXCHANGE_SUFFIX.to_string(),
            analysis_range: Period::SixMonths,
            chart_window: 60,
            cache_ttl: Duration::from_secs(60),
            request_timeout: Duration::from_secs(30),
            commentary_timeout: Duration::from_secs(120),
            screening: ScreeningConfig::default(),
            indicators: IndicatorConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(StockError::ConfigError("model must not be empty".to_string()));
        }

        let s = &self.screening;
        if !(0.0..=100.0).contains(&s.rsi_lower)
            || !(0.0..=100.0).contains(&s.rsi_upper)
            || s.rsi_lower >= s.rsi_upper
        {
            return Err(StockError::ConfigError(format!(
                "RSI band must satisfy 0 <= lower < upper <= 100 (got {} .. {})",
                s.rsi_lower, s.rsi_upper
            )));
        }
        if s.max_picks == 0 {
            return Err(StockError::ConfigError(
                "max_picks must be greater than 0".to_string(),
            ));
        }
        if s.fallback.is_empty() {
            return Err(StockError::ConfigError(
                "fallback symbols must not be empty".to_string(),
            ));
        }
        if s.universe.is_empty() {
            return Err(StockError::ConfigError(
                "screening universe must not be empty".to_string(),
            ));
        }
        if s.sampling.size() == Some(0) {
            return Err(StockError::ConfigError(
                "sample size must be greater than 0".to_string(),
            ));
        }

        let i = &self.indicators;
        if i.rsi_period == 0 || i.sma_period == 0 || i.atr_period == 0 {
            return Err(StockError::ConfigError(
                "indicator periods must be greater than 0".to_string(),
            ));
        }

        let r = &self.risk;
        if r.stop_multiplier <= 0.0 || r.target_multiplier <= 0.0 {
            return Err(StockError::ConfigError(
                "risk multipliers must be positive".to_string(),
            ));
        }

        if self.chart_window == 0 {
            return Err(StockError::ConfigError(
                "chart_window must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    model: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    language: Option<Language>,
    allocation_capital: Option<u64>,
    analysis_range: Option<Period>,
    chart_window: Option<usize>,
    cache_ttl: Option<Duration>,
    request_timeout: Option<Duration>,
    commentary_timeout: Option<Duration>,
    screening: Option<ScreeningConfig>,
    sampling: Option<Sampling>,
    seed: Option<u64>,
    indicators: Option<IndicatorConfig>,
    risk: Option<RiskConfig>,
    env_error: Option<StockError>,
}

impl StockConfigBuilder {
    /// Set the generation model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the token limit per commentary
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the output language
    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Set the capital used by the allocation commentary
    pub fn allocation_capital(mut self, capital: u64) -> Self {
        self.allocation_capital = Some(capital);
        self
    }

    /// Set the history range for detailed analysis
    pub fn analysis_range(mut self, range: Period) -> Self {
        self.analysis_range = Some(range);
        self
    }

    /// Set the chart window length
    pub fn chart_window(mut self, bars: usize) -> Self {
        self.chart_window = Some(bars);
        self
    }

    /// Set the market-data memo lifetime
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Set the Yahoo Finance request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the commentary generation timeout
    pub fn commentary_timeout(mut self, timeout: Duration) -> Self {
        self.commentary_timeout = Some(timeout);
        self
    }

    /// Replace the whole screening section
    pub fn screening(mut self, screening: ScreeningConfig) -> Self {
        self.screening = Some(screening);
        self
    }

    /// Override only the sampling strategy
    pub fn sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = Some(sampling);
        self
    }

    /// Fix the sampling seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set indicator periods
    pub fn indicators(mut self, indicators: IndicatorConfig) -> Self {
        self.indicators = Some(indicators);
        self
    }

    /// Set risk multiples
    pub fn risk(mut self, risk: RiskConfig) -> Self {
        self.risk = Some(risk);
        self
    }

    /// Apply `SCOUT_MODEL` and `SCOUT_LANGUAGE` when set.
    /// Explicit setters called afterwards still win.
    pub fn with_env(mut self) -> Self {
        if let Ok(model) = std::env::var(MODEL_ENV) {
            if !model.trim().is_empty() {
                self.model = Some(model);
            }
        }
        if let Ok(lang) = std::env::var(LANGUAGE_ENV) {
            match lang.parse::<Language>() {
                Ok(language) => self.language = Some(language),
                Err(e) => self.env_error = Some(e),
            }
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        if let Some(err) = self.env_error {
            return Err(err);
        }

        let defaults = StockConfig::default();

        let mut screening = self.screening.unwrap_or(defaults.screening);
        if let Some(sampling) = self.sampling {
            screening.sampling = sampling;
        }
        if let Some(seed) = self.seed {
            screening.seed = Some(seed);
        }

        let config = StockConfig {
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            language: self.language.unwrap_or(defaults.language),
            allocation_capital: self.allocation_capital.unwrap_or(defaults.allocation_capital),
            default_suffix: defaults.default_suffix,
            analysis_range: self.analysis_range.unwrap_or(defaults.analysis_range),
            chart_window: self.chart_window.unwrap_or(defaults.chart_window),
            cache_ttl: self.cache_ttl.unwrap_or(defaults.cache_ttl),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            commentary_timeout: self
                .commentary_timeout
                .unwrap_or(defaults.commentary_timeout),
            screening,
            indicators: self.indicators.unwrap_or(defaults.indicators),
            risk: self.risk.unwrap_or(defaults.risk),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StockConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.screening.sampling, Sampling::Random { size: 15 });
        assert_eq!(config.screening.universe.len(), 48);
        assert_eq!(config.screening.max_picks, 4);
        assert_eq!(config.indicators.sma_period, 20);
        assert_eq!(config.risk.stop_multiplier, 2.0);
        assert_eq!(config.risk.target_multiplier, 4.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StockConfig::builder()
            .model("gemini-2.5-pro")
            .language(Language::English)
            .sampling(Sampling::Leading { size: 25 })
            .seed(7)
            .request_timeout(Duration::from_secs(10))
            .commentary_timeout(Duration::from_secs(45))
            .build()
            .unwrap();

        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.language, Language::English);
        assert_eq!(config.screening.sampling, Sampling::Leading { size: 25 });
        assert_eq!(config.screening.seed, Some(7));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.commentary_timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_validation_rsi_band() {
        let mut config = StockConfig::default();
        config.screening.rsi_lower = 65.0;
        config.screening.rsi_upper = 45.0;
        assert!(config.validate().is_err());

        config.screening.rsi_lower = 45.0;
        config.screening.rsi_upper = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_sizes() {
        let err = StockConfig::builder()
            .sampling(Sampling::Random { size: 0 })
            .build();
        assert!(err.is_err());

        let mut config = StockConfig::default();
        config.screening.max_picks = 0;
        assert!(config.validate().is_err());

        let mut config = StockConfig::default();
        config.indicators.atr_period = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_risk_multipliers() {
        let config = StockConfig::builder()
            .risk(RiskConfig {
                stop_multiplier: 0.0,
                target_multiplier: 4.0,
            })
            .build();
        assert!(config.is_err());
    }

    #[test]
    fn test_validation_empty_fallback() {
        let mut config = StockConfig::default();
        config.screening.fallback.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sampling_serde() {
        let json = serde_json::to_string(&Sampling::Random { size: 15 }).unwrap();
        assert_eq!(json, r#"{"mode":"random","size":15}"#);
        let all: Sampling = serde_json::from_str(r#"{"mode":"all"}"#).unwrap();
        assert_eq!(all, Sampling::All);
    }
}
