//! Provider abstraction for historical OHLCV data.
//!
//! [`MarketDataProvider`] is the single capability the rest of the bot needs
//! from a market-data vendor.  It is async and object safe so a provider can
//! be chosen at runtime as `Box<dyn MarketDataProvider>`.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use super::Bar;

/// Errors that can occur within a [`MarketDataProvider`] implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request succeeded but returned no bars.
    #[error("no data returned for {symbol}")]
    NoData { symbol: String },

    /// Network failure, timeout or undecodable body.
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The vendor answered with an error status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response parsed as JSON but not in the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch bars for `symbol` at `interval` (e.g. `"1d"`, `"1m"`), oldest
    /// first.  `start` / `end` are inclusive calendar dates; the provider
    /// chooses a default window when they are absent.
    ///
    /// Fails with [`ProviderError::NoData`] when the result set is empty.
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        interval: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    struct FixedProvider(Vec<Bar>);

    #[async_trait]
    impl MarketDataProvider for FixedProvider {
        async fn fetch_ohlcv(
            &self,
            symbol: &str,
            _interval: &str,
            _start: Option<NaiveDate>,
            _end: Option<NaiveDate>,
        ) -> Result<Vec<Bar>, ProviderError> {
            if self.0.is_empty() {
                return Err(ProviderError::NoData {
                    symbol: symbol.to_string(),
                });
            }
            Ok(self.0.clone())
        }
    }

    fn provider(empty: bool) -> Box<dyn MarketDataProvider> {
        if empty {
            Box::new(FixedProvider(Vec::new()))
        } else {
            let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
            Box::new(FixedProvider(vec![Bar::new(ts, 1.0, 2.0, 0.5, 1.5, 10.0)]))
        }
    }

    #[tokio::test]
    async fn dynamic_provider_returns_bars() {
        let bars = provider(false)
            .fetch_ohlcv("AAPL", "1d", None, None)
            .await
            .unwrap();
        assert_eq!(bars.len(), 1);
    }

    #[tokio::test]
    async fn empty_result_is_no_data() {
        let err = provider(true)
            .fetch_ohlcv("AAPL", "1d", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NoData { ref symbol } if symbol == "AAPL"));
        assert_eq!(err.to_string(), "no data returned for AAPL");
    }
}
