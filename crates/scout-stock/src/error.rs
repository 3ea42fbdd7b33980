//! Error types for stock screening and analysis

use thiserror::Error;

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Unknown lookback period string
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Prompt or report template error
    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    /// Report file could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Every requested symbol failed to produce an analysis
    #[error("No symbols could be analyzed (requested: {requested})")]
    NoSymbolsAnalyzed {
        requested: usize,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl From<scout_llm::LLMError> for StockError {
    fn from(err: scout_llm::LLMError) -> Self {
        match err {
            scout_llm::LLMError::ConfigurationError(msg) => StockError::ConfigError(msg),
            other => StockError::Other(other.to_string()),
        }
    }
}

impl From<yahoo_finance_api::YahooError> for StockError {
    fn from(err: yahoo_finance_api::YahooError) -> Self {
        match err {
            yahoo_finance_api::YahooError::ConnectionFailed(e) => StockError::NetworkError(e),
            other => StockError::YahooFinanceError(other.to_string()),
        }
    }
}
