// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the signal
// generator and the historical report.  Every indicator returns a `Series`
// aligned 1:1 with its input: positions before the warm-up window is filled
// are `None`, never zero.  Inputs that can never fill the window are rejected
// with `IndicatorError::InsufficientData` instead of yielding an all-`None`
// series.

pub mod adx;
pub mod ema;
pub mod mfi;
pub mod roc;
pub mod rsi;
pub mod vwap;

use thiserror::Error;

use crate::market_data::Bar;

/// Indicator output, one slot per input point (index 0 = oldest).
pub type Series = Vec<Option<f64>>;

/// Errors produced by the indicator engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("{indicator}: period must be at least 1, got {period}")]
    InvalidPeriod {
        indicator: &'static str,
        period: usize,
    },

    #[error("{indicator}: insufficient data, need at least {required} points, got {available}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        available: usize,
    },

    #[error("{indicator}: invalid parameter: {message}")]
    InvalidParameter {
        indicator: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, IndicatorError>;

// =============================================================================
// Shared helpers
// =============================================================================

/// Typical price `(high + low + close) / 3`.
pub fn typical_price(bar: &Bar) -> f64 {
    (bar.high + bar.low + bar.close) / 3.0
}

/// Most recent defined value of a series.
pub fn last_value(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

pub(crate) fn check_period(indicator: &'static str, period: usize) -> Result<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod { indicator, period });
    }
    Ok(())
}

pub(crate) fn check_len(indicator: &'static str, required: usize, available: usize) -> Result<()> {
    if available < required {
        return Err(IndicatorError::InsufficientData {
            indicator,
            required,
            available,
        });
    }
    Ok(())
}

/// Sum over a trailing window of `window` values.
///
/// `values[..offset]` are placeholders with no real data behind them, so the
/// first defined output is at `offset + window - 1`.
pub(crate) fn rolling_sum(values: &[f64], window: usize, offset: usize) -> Series {
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }
    for i in (offset + window - 1)..values.len() {
        out[i] = Some(values[i + 1 - window..=i].iter().sum());
    }
    out
}

/// Mean over a trailing window; see [`rolling_sum`] for `offset`.
pub(crate) fn rolling_mean(values: &[f64], window: usize, offset: usize) -> Series {
    let w = window as f64;
    rolling_sum(values, window, offset)
        .into_iter()
        .map(|v| v.map(|s| s / w))
        .collect()
}

/// `100 - 100 / (1 + ratio)`, saturating at 100 when the denominator of the
/// ratio is zero.  Shared by RSI and MFI.
pub(crate) fn saturating_oscillator(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 100.0;
    }
    let ratio = numerator / denominator;
    100.0 - 100.0 / (1.0 + ratio)
}
