//! Session memo for market data
//!
//! Screening and analysis are stateless; the memo only saves repeated
//! requests when an interactive session runs the same symbols again.

use async_trait::async_trait;
use cached::{Cached, TimedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::api::MarketDataProvider;
use crate::error::Result;
use crate::model::{Fundamentals, PriceSeries, Symbol};
use crate::period::Period;

/// Cache key for market-data requests
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Stock symbol
    pub symbol: Symbol,
    /// Request kind ("history", "fundamentals")
    pub endpoint: &'static str,
    /// Lookback period, when the request has one
    pub period: Option<Period>,
}

impl CacheKey {
    pub fn history(symbol: &Symbol, period: Period) -> Self {
        Self {
            symbol: symbol.clone(),
            endpoint: "history",
            period: Some(period),
        }
    }

    pub fn fundamentals(symbol: &Symbol) -> Self {
        Self {
            symbol: symbol.clone(),
            endpoint: "fundamentals",
            period: None,
        }
    }
}

/// Thread-safe timed cache
pub struct StockCache<V> {
    cache: Arc<RwLock<TimedCache<CacheKey, V>>>,
}

impl<V: Clone> StockCache<V> {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a value from the cache
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        // TimedCache evicts on read, so lookups need the write lock
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a value into the cache
    pub async fn insert(&self, key: CacheKey, value: V) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Return the cached value, or run `fetcher` and cache a success.
    /// Errors are never cached.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: CacheKey,
        fetcher: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            tracing::debug!("Cache hit for key: {:?}", key);
            return Ok(value);
        }

        tracing::debug!("Cache miss for key: {:?}", key);

        let value = fetcher().await?;
        self.insert(key, value.clone()).await;

        Ok(value)
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<V> Clone for StockCache<V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

/// [`MarketDataProvider`] decorator that memoises successful responses
pub struct CachedMarketData {
    inner: Arc<dyn MarketDataProvider>,
    history: StockCache<PriceSeries>,
    fundamentals: StockCache<Fundamentals>,
}

impl CachedMarketData {
    pub fn new(inner: Arc<dyn MarketDataProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            history: StockCache::new(ttl),
            fundamentals: StockCache::new(ttl),
        }
    }
}

#[async_trait]
impl MarketDataProvider for CachedMarketData {
    async fn price_history(&self, symbol: &Symbol, period: Period) -> Result<PriceSeries> {
        self.history
            .get_or_fetch(CacheKey::history(symbol, period), || {
                self.inner.price_history(symbol, period)
            })
            .await
    }

    async fn fundamentals(&self, symbol: &Symbol) -> Result<Fundamentals> {
        self.fundamentals
            .get_or_fetch(CacheKey::fundamentals(symbol), || {
                self.inner.fundamentals(symbol)
            })
            .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
