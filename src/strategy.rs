// =============================================================================
// Signal Generator: VWAP / EMA crossover / RSI momentum filter
// =============================================================================
//
// Evaluated on the latest bar of the window:
//   BUY   close > VWAP  &&  EMA_fast > EMA_slow  &&  RSI > rsi_buy_above
//   SELL  close < VWAP  &&  EMA_fast < EMA_slow  &&  RSI < rsi_sell_below
//   otherwise no signal.
//
// Deterministic and stateless given the window.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::ema::ema;
use crate::indicators::rsi::rsi;
use crate::indicators::vwap::{session_vwap, vwap};
use crate::indicators::{last_value, Result};
use crate::market_data::Bar;
use crate::types::Side;

fn default_ema_fast() -> usize {
    9
}

fn default_ema_slow() -> usize {
    21
}

fn default_rsi_period() -> usize {
    7
}

fn default_rsi_buy_above() -> f64 {
    55.0
}

fn default_rsi_sell_below() -> f64 {
    45.0
}

/// Indicator lengths and RSI thresholds for the signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalParams {
    #[serde(default = "default_ema_fast")]
    pub ema_fast: usize,
    #[serde(default = "default_ema_slow")]
    pub ema_slow: usize,
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    /// RSI must be strictly above this for a BUY.
    #[serde(default = "default_rsi_buy_above")]
    pub rsi_buy_above: f64,
    /// RSI must be strictly below this for a SELL.
    #[serde(default = "default_rsi_sell_below")]
    pub rsi_sell_below: f64,
    /// Restart VWAP at each UTC day instead of accumulating over the whole
    /// window.
    #[serde(default)]
    pub session_vwap: bool,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            ema_fast: default_ema_fast(),
            ema_slow: default_ema_slow(),
            rsi_period: default_rsi_period(),
            rsi_buy_above: default_rsi_buy_above(),
            rsi_sell_below: default_rsi_sell_below(),
            session_vwap: false,
        }
    }
}

/// Latest indicator readings the decision is made on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub close: f64,
    pub vwap: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
}

impl SignalSnapshot {
    /// Compute the snapshot for the last bar of `bars`.
    ///
    /// `Ok(None)` when an indicator has no value at the last bar (e.g. no
    /// volume traded yet, so VWAP is undefined).
    pub fn from_bars(bars: &[Bar], params: &SignalParams) -> Result<Option<Self>> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        let ema_fast = last_value(&ema(&closes, params.ema_fast)?);
        let ema_slow = last_value(&ema(&closes, params.ema_slow)?);
        let rsi = last_value(&rsi(&closes, params.rsi_period)?);
        let vwap = if params.session_vwap {
            last_value(&session_vwap(bars)?)
        } else {
            last_value(&vwap(bars)?)
        };

        Ok(match (closes.last(), vwap, ema_fast, ema_slow, rsi) {
            (Some(&close), Some(vwap), Some(ema_fast), Some(ema_slow), Some(rsi)) => Some(Self {
                close,
                vwap,
                ema_fast,
                ema_slow,
                rsi,
            }),
            _ => None,
        })
    }

    pub fn evaluate(&self, params: &SignalParams) -> Option<Side> {
        if self.close > self.vwap && self.ema_fast > self.ema_slow && self.rsi > params.rsi_buy_above {
            return Some(Side::Buy);
        }
        if self.close < self.vwap && self.ema_fast < self.ema_slow && self.rsi < params.rsi_sell_below {
            return Some(Side::Sell);
        }
        None
    }
}

/// Decide BUY / SELL / nothing for the latest bar of `bars`.
pub fn generate_signal(bars: &[Bar], params: &SignalParams) -> Result<Option<Side>> {
    let snapshot = match SignalSnapshot::from_bars(bars, params)? {
        Some(s) => s,
        None => return Ok(None),
    };
    let signal = snapshot.evaluate(params);

    debug!(
        close = snapshot.close,
        vwap = snapshot.vwap,
        ema_fast = snapshot.ema_fast,
        ema_slow = snapshot.ema_slow,
        rsi = snapshot.rsi,
        signal = ?signal,
        "signal evaluated"
    );

    Ok(signal)
}
