// =============================================================================
// Report mode: historical indicator table
// =============================================================================
//
// Fetches daily (or other interval) bars from a historical provider, computes
// RSI(14), VWAP, MFI(14), ROC(9) and ADX(14), and logs the most recent rows.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::indicators::{adx::adx, mfi::mfi, roc::roc, rsi::rsi, vwap::vwap};
use crate::market_data::{Bar, MarketDataProvider};

const RSI_LENGTH: usize = 14;
const MFI_LENGTH: usize = 14;
const ROC_LENGTH: usize = 9;
const ADX_LENGTH: usize = 14;

/// Rows logged at the end of a report.
const TAIL_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArgs {
    pub symbol: String,
    pub interval: String,
    pub start: NaiveDate,
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            symbol: "AAPL".to_string(),
            interval: "1d".to_string(),
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
        }
    }
}

impl ReportArgs {
    /// Positional `[SYMBOL] [INTERVAL] [START]`, each optional.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut out = Self::default();
        let mut args = args.into_iter();

        if let Some(symbol) = args.next() {
            out.symbol = symbol.trim().to_uppercase();
        }
        if let Some(interval) = args.next() {
            out.interval = interval;
        }
        if let Some(start) = args.next() {
            out.start = NaiveDate::parse_from_str(&start, "%Y-%m-%d")
                .with_context(|| format!("invalid start date {start:?}, expected YYYY-MM-DD"))?;
        }
        Ok(out)
    }
}

/// One bar with every indicator value aligned to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub rsi: Option<f64>,
    pub vwap: Option<f64>,
    pub mfi: Option<f64>,
    pub roc: Option<f64>,
    pub adx: Option<f64>,
}

pub fn build_rows(bars: &[Bar]) -> Result<Vec<ReportRow>> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let rsi = rsi(&closes, RSI_LENGTH)?;
    let vwap = vwap(bars)?;
    let mfi = mfi(bars, MFI_LENGTH)?;
    let roc = roc(&closes, ROC_LENGTH)?;
    let adx = adx(bars, ADX_LENGTH)?;

    Ok(bars
        .iter()
        .enumerate()
        .map(|(i, bar)| ReportRow {
            timestamp: bar.timestamp,
            close: bar.close,
            rsi: rsi[i],
            vwap: vwap[i],
            mfi: mfi[i],
            roc: roc[i],
            adx: adx[i],
        })
        .collect())
}

pub async fn run(provider: &dyn MarketDataProvider, args: &ReportArgs) -> Result<Vec<ReportRow>> {
    info!(
        symbol = %args.symbol,
        interval = %args.interval,
        start = %args.start,
        "fetching historical bars"
    );

    let bars = provider
        .fetch_ohlcv(&args.symbol, &args.interval, Some(args.start), None)
        .await?;
    info!(symbol = %args.symbol, bars = bars.len(), "bars received");

    let rows = build_rows(&bars)
        .with_context(|| format!("not enough history for {} to compute the report", args.symbol))?;

    let skip = rows.len().saturating_sub(TAIL_ROWS);
    for row in &rows[skip..] {
        info!(
            timestamp = %row.timestamp,
            close = row.close,
            rsi = ?row.rsi,
            vwap = ?row.vwap,
            mfi = ?row.mfi,
            roc = ?row.roc,
            adx = ?row.adx,
            "{}",
            args.symbol
        );
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::indicators::test_support::bars;
    use crate::market_data::provider::ProviderError;

    fn history(n: usize) -> Vec<Bar> {
        let rows: Vec<(f64, f64, f64, f64)> = (0..n)
            .map(|i| {
                let c = 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.2;
                (c + 1.0, c - 1.0, c, 1_000.0 + (i % 7) as f64 * 50.0)
            })
            .collect();
        bars(&rows)
    }

    struct StaticProvider(Vec<Bar>);

    #[async_trait]
    impl MarketDataProvider for StaticProvider {
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

    #[test]
    fn default_args() {
        let args = ReportArgs::from_args(Vec::new()).unwrap();
        assert_eq!(args.symbol, "AAPL");
        assert_eq!(args.interval, "1d");
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    }

    #[test]
    fn positional_args_override_defaults() {
        let args =
            ReportArgs::from_args(["msft", "1h", "2024-02-01"].map(String::from)).unwrap();
        assert_eq!(args.symbol, "MSFT");
        assert_eq!(args.interval, "1h");
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn bad_start_date_is_rejected() {
        assert!(ReportArgs::from_args(["AAPL", "1d", "01/02/2024"].map(String::from)).is_err());
    }

    #[test]
    fn rows_align_with_bars() {
        let bars = history(40);
        let rows = build_rows(&bars).unwrap();
        assert_eq!(rows.len(), 40);

        // Warm-up boundaries.
        assert!(rows[13].rsi.is_none() && rows[14].rsi.is_some());
        assert!(rows[8].roc.is_none() && rows[9].roc.is_some());
        assert!(rows[26].adx.is_none() && rows[27].adx.is_some());
        assert!(rows[0].vwap.is_some());

        let last = rows.last().unwrap();
        assert_eq!(last.close, bars[39].close);
        assert!(last.mfi.unwrap() >= 0.0 && last.mfi.unwrap() <= 100.0);
    }

    #[test]
    fn short_history_is_an_error() {
        assert!(build_rows(&history(20)).is_err());
    }

    #[tokio::test]
    async fn run_returns_full_table() {
        let provider = StaticProvider(history(30));
        let rows = run(&provider, &ReportArgs::default()).await.unwrap();
        assert_eq!(rows.len(), 30);
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let provider = StaticProvider(Vec::new());
        let err = run(&provider, &ReportArgs::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "no data returned for AAPL");
    }
}
