// =============================================================================
// Yahoo Finance historical provider: public chart endpoint
// =============================================================================
//
// GET {base}/v8/finance/chart/{symbol}?interval=..&period1=..&period2=..
//
// The chart API returns columnar arrays (`timestamp`, `open`, `high`, ...)
// where any slot may be null on halted or partial sessions; such rows are
// dropped rather than zero-filled.
// =============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::provider::{MarketDataProvider, ProviderError};
use super::Bar;

const BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Default look-back when no start date is supplied.
const DEFAULT_LOOKBACK_DAYS: i64 = 30;

#[derive(Debug, Clone)]
pub struct YahooFinanceProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            // The endpoint rejects requests without a browser-like agent.
            .user_agent("Mozilla/5.0 (compatible; vwap-scalper/1.0)")
            .timeout(std::time::Duration::from_secs(15))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }
}

impl YahooFinanceProvider {
    /// `{base}/v8/finance/chart/{symbol}` with the symbol as one encoded
    /// path segment.
    fn chart_url(&self, symbol: &str) -> Result<reqwest::Url, ProviderError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ProviderError::Malformed(format!("base url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ProviderError::Malformed(format!("base url {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart"])
            .push(symbol);
        Ok(url)
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    #[instrument(skip(self), name = "yahoo::fetch_ohlcv")]
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        interval: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, ProviderError> {
        let (period1, period2) = query_window(start, end, Utc::now());
        let url = self.chart_url(symbol)?;

        let resp = self
            .client
            .get(url)
            .query(&[
                ("interval", interval.to_string()),
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bars = parse_chart(symbol, &body)?;
        debug!(symbol, interval, count = bars.len(), "bars fetched");
        Ok(bars)
    }
}

/// `(period1, period2)` in UNIX seconds.  `end` is inclusive, so the window
/// runs to midnight after it.
fn query_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> (i64, i64) {
    let end_ts = match end {
        Some(d) => midnight(d) + Duration::days(1),
        None => now,
    };
    let start_ts = match start {
        Some(d) => midnight(d),
        None => end_ts - Duration::days(DEFAULT_LOOKBACK_DAYS),
    };
    (start_ts.timestamp(), end_ts.timestamp())
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

// ---------------------------------------------------------------------------
// Response model
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Convert a chart payload into bars, oldest first.
fn parse_chart(symbol: &str, body: &str) -> Result<Vec<Bar>, ProviderError> {
    let resp: ChartResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("chart JSON: {e}")))?;

    if let Some(err) = resp.chart.error {
        return Err(ProviderError::Api {
            status: 200,
            body: format!("{}: {}", err.code, err.description),
        });
    }

    let result = match resp.chart.result.and_then(|r| r.into_iter().next()) {
        Some(r) => r,
        None => {
            return Err(ProviderError::NoData {
                symbol: symbol.to_string(),
            })
        }
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    let mut skipped = 0usize;
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let field = |col: &[Option<f64>]| col.get(i).copied().flatten();
        let row = (
            DateTime::<Utc>::from_timestamp(ts, 0),
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
            field(&quote.volume),
        );
        match row {
            (Some(t), Some(o), Some(h), Some(l), Some(c), Some(v)) => {
                bars.push(Bar::new(t, o, h, l, c, v));
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(symbol, skipped, "dropped incomplete chart rows");
    }
    let inconsistent = bars.iter().filter(|b| !b.is_consistent()).count();
    if inconsistent > 0 {
        warn!(symbol, inconsistent, "bars with close/open outside high-low range");
    }

    if bars.is_empty() {
        return Err(ProviderError::NoData {
            symbol: symbol.to_string(),
        });
    }
    Ok(bars)
}
