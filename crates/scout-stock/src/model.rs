//! Core data model: symbols, price bars, price series and fundamentals

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

use crate::error::{Result, StockError};

/// Suffix appended to bare Taiwan Stock Exchange codes
pub const DEFAULT_EXCHANGE_SUFFIX: &str = ".TW";

static SYMBOL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9^][A-Z0-9\-=]*(\.[A-Z]{1,4})?$").expect("symbol pattern is valid")
});

/// Exchange-qualified ticker, e.g. `2330.TW`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Validate and upper-case a ticker as given
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let ticker = raw.as_ref().trim().to_uppercase();
        if ticker.is_empty() || !SYMBOL_RE.is_match(&ticker) {
            return Err(StockError::InvalidSymbol(raw.as_ref().to_string()));
        }
        Ok(Self(ticker))
    }

    /// Like [`Symbol::new`], but a ticker without an exchange suffix gets
    /// `default_suffix` appended (`2330` becomes `2330.TW`).
    pub fn with_default_suffix(raw: impl AsRef<str>, default_suffix: &str) -> Result<Self> {
        let ticker = raw.as_ref().trim().to_uppercase();
        if ticker.contains('.') || default_suffix.is_empty() {
            Self::new(ticker)
        } else {
            Self::new(format!("{ticker}{default_suffix}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse a manually entered list such as `"2330, 2317"`.
///
/// Entries are separated by commas or whitespace; blanks are dropped and
/// duplicates keep their first position. A malformed entry is logged and
/// skipped; the list only fails when every entry is malformed.
pub fn parse_symbol_list(input: &str, default_suffix: &str) -> Result<Vec<Symbol>> {
    let mut symbols: Vec<Symbol> = Vec::new();
    let mut rejected: Vec<&str> = Vec::new();
    for entry in input.split(|c: char| c == ',' || c.is_whitespace()) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        match Symbol::with_default_suffix(entry, default_suffix) {
            Ok(symbol) if !symbols.contains(&symbol) => symbols.push(symbol),
            Ok(_) => {}
            Err(e) => {
                warn!(entry, error = %e, "Skipping malformed ticker");
                rejected.push(entry);
            }
        }
    }

    if symbols.is_empty() && !rejected.is_empty() {
        return Err(StockError::InvalidSymbol(rejected.join(", ")));
    }
    Ok(symbols)
}

/// One trading session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Chronologically ordered bars for one symbol, at most one per date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: Symbol,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, sorting by date. When a date repeats the later bar
    /// wins, since providers emit an intraday duplicate of the current session.
    pub fn new(symbol: Symbol, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            symbol,
            bars: deduped,
        }
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Valuation snapshot; a `None` field means the provider had no value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    /// Year-over-year revenue growth as a fraction (0.12 = 12 %)
    pub revenue_growth: Option<f64>,
}

/// Marker rendered for any value the provider did not supply
pub const NOT_AVAILABLE: &str = "N/A";

impl Fundamentals {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.trailing_pe.is_none() && self.price_to_book.is_none() && self.revenue_growth.is_none()
    }

    pub fn pe_display(&self) -> String {
        format_optional(self.trailing_pe, 2)
    }

    pub fn pb_display(&self) -> String {
        format_optional(self.price_to_book, 2)
    }

    /// Revenue growth as a percentage with one decimal, e.g. `12.3%`
    pub fn revenue_growth_display(&self) -> String {
        self.revenue_growth
            .map_or_else(|| NOT_AVAILABLE.to_string(), |g| format!("{:.1}%", g * 100.0))
    }
}

/// Format with fixed decimals, or the "not available" marker
pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}
