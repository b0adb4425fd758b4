// =============================================================================
// Rate of Change (ROC): Momentum Indicator
// =============================================================================
//
// ROC measures the percentage change in price over a look-back period:
//   ROC = ((close - close_n) / close_n) * 100
//
// Positive ROC indicates upward momentum; negative indicates downward.

use super::{check_len, check_period, Result, Series};

const NAME: &str = "roc";

/// Calculate ROC aligned with `closes`.
///
/// The first `length` positions are `None`, as is any position whose base
/// price is zero.
pub fn roc(closes: &[f64], length: usize) -> Result<Series> {
    check_period(NAME, length)?;
    check_len(NAME, length + 1, closes.len())?;

    let mut out = vec![None; closes.len()];
    for i in length..closes.len() {
        let prev = closes[i - length];
        if prev != 0.0 {
            out[i] = Some(((closes[i] - prev) / prev) * 100.0);
        }
    }
    Ok(out)
}
