// =============================================================================
// Volume Weighted Average Price (VWAP)
// =============================================================================
//
//   tp_t   = (high_t + low_t + close_t) / 3
//   VWAP_t = sum(tp * volume)[0..=t] / sum(volume)[0..=t]
//
// `vwap` accumulates from the first bar it is given: callers wanting a daily
// VWAP either pass one session of bars or use `session_vwap`, which restarts
// the accumulation whenever the UTC calendar date changes.
// =============================================================================

use chrono::NaiveDate;

use super::{check_len, typical_price, Result, Series};
use crate::market_data::Bar;

const NAME: &str = "vwap";

/// Cumulative VWAP over the whole slice.
///
/// Positions where no volume has traded yet are `None`.
pub fn vwap(bars: &[Bar]) -> Result<Series> {
    accumulate(bars, |_| false)
}

/// VWAP that resets at the first bar of every UTC day.
pub fn session_vwap(bars: &[Bar]) -> Result<Series> {
    let mut session: Option<NaiveDate> = None;
    accumulate(bars, move |bar| {
        let day = bar.timestamp.date_naive();
        let new_session = session.is_some_and(|d| d != day);
        session = Some(day);
        new_session
    })
}

fn accumulate(bars: &[Bar], mut resets: impl FnMut(&Bar) -> bool) -> Result<Series> {
    check_len(NAME, 1, bars.len())?;

    let mut out = Vec::with_capacity(bars.len());
    let mut cum_pv = 0.0;
    let mut cum_vol = 0.0;

    for bar in bars {
        if resets(bar) {
            cum_pv = 0.0;
            cum_vol = 0.0;
        }
        cum_pv += typical_price(bar) * bar.volume;
        cum_vol += bar.volume;

        out.push(if cum_vol > 0.0 {
            Some(cum_pv / cum_vol)
        } else {
            None
        });
    }
    Ok(out)
}
