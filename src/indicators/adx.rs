// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. ATR = rolling mean of TR over `length`.
//   4. +DI = 100 * rolling_mean(+DM) / ATR
//      -DI = 100 * rolling_mean(-DM) / ATR
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = rolling mean of DX over `length`.
//
// The first bar has no predecessor, so DX is defined from index `length` and
// ADX from index `2 * length - 1`.
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

use super::{check_len, check_period, rolling_mean, Result, Series};
use crate::market_data::Bar;

const NAME: &str = "adx";

/// Compute the ADX series for `bars`.
///
/// Requires `2 * length` bars so that at least one ADX value exists.
pub fn adx(bars: &[Bar], length: usize) -> Result<Series> {
    check_period(NAME, length)?;
    check_len(NAME, 2 * length, bars.len())?;

    let n = bars.len();

    // ------------------------------------------------------------------
    // Step 1 & 2: Raw +DM, -DM, and True Range; index 0 is a placeholder
    // ------------------------------------------------------------------
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    let mut tr = vec![0.0; n];

    for i in 1..n {
        let (cur, prev) = (&bars[i], &bars[i - 1]);

        tr[i] = (cur.high - cur.low)
            .max((cur.high - prev.close).abs())
            .max((cur.low - prev.close).abs());

        let up_move = cur.high - prev.high;
        let down_move = prev.low - cur.low;

        if up_move > down_move && up_move > 0.0 {
            plus_dm[i] = up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm[i] = down_move;
        }
    }

    // ------------------------------------------------------------------
    // Step 3-5: rolling means and DX
    // ------------------------------------------------------------------
    let atr = rolling_mean(&tr, length, 1);
    let plus_avg = rolling_mean(&plus_dm, length, 1);
    let minus_avg = rolling_mean(&minus_dm, length, 1);

    let mut dx = vec![0.0; n];
    for i in length..n {
        if let (Some(atr), Some(p), Some(m)) = (atr[i], plus_avg[i], minus_avg[i]) {
            dx[i] = compute_dx(p, m, atr);
        }
    }

    // ------------------------------------------------------------------
    // Step 6: ADX
    // ------------------------------------------------------------------
    Ok(rolling_mean(&dx, length, length))
}

/// DX from averaged +DM, -DM and ATR.
///
/// Zero range or zero directional movement means no trend: DX = 0.
fn compute_dx(plus_dm: f64, minus_dm: f64, atr: f64) -> f64 {
    if atr == 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * plus_dm / atr;
    let minus_di = 100.0 * minus_dm / atr;

    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return 0.0;
    }
    (plus_di - minus_di).abs() / di_sum * 100.0
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{assert_close, bars};
    use crate::indicators::IndicatorError;

    fn trending(n: usize) -> Vec<Bar> {
        let rows: Vec<_> = (0..n)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                (base + 1.5, base - 0.5, base + 1.0, 10.0)
            })
            .collect();
        bars(&rows)
    }

    #[test]
    fn adx_period_zero() {
        assert!(matches!(
            adx(&trending(50), 0),
            Err(IndicatorError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn adx_insufficient_data() {
        assert_eq!(
            adx(&trending(27), 14),
            Err(IndicatorError::InsufficientData {
                indicator: "adx",
                required: 28,
                available: 27
            })
        );
    }

    #[test]
    fn adx_minimum_bars_exact() {
        let period = 5;
        let series = adx(&trending(2 * period), period).unwrap();
        assert!(series[..2 * period - 1].iter().all(Option::is_none));
        assert!(series[2 * period - 1].is_some());
    }

    #[test]
    fn adx_strong_uptrend() {
        // Higher highs and higher lows with no down moves: -DM is always zero,
        // so every DX is 100.
        let series = adx(&trending(60), 14).unwrap();
        for v in series.iter().flatten() {
            assert!((v - 100.0).abs() < 1e-9, "expected ADX 100, got {v}");
        }
    }

    #[test]
    fn adx_flat_market() {
        let input = bars(&vec![(101.0, 99.0, 100.0, 10.0); 60]);
        for v in adx(&input, 14).unwrap().into_iter().flatten() {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn adx_zero_range_is_defined() {
        // ATR == 0 must not produce NaN.
        let input = bars(&vec![(100.0, 100.0, 100.0, 10.0); 10]);
        let series = adx(&input, 3).unwrap();
        assert_close(series[5], 0.0);
    }

    #[test]
    fn adx_known_values() {
        // length 2.
        //   i=1: up 2, down -1  => +DM 2, -DM 0, TR max(3, 3, 0) = 3
        //   i=2: up -1, down 3  => +DM 0, -DM 3, TR max(5, 1, 6) = 6
        //   i=3: up 1, down -4  => +DM 1, -DM 0, TR max(2, 4, 2) = 4
        let input = bars(&[
            (10.0, 8.0, 9.0, 1.0),
            (12.0, 9.0, 12.0, 1.0),
            (11.0, 6.0, 8.0, 1.0),
            (12.0, 10.0, 12.0, 1.0),
        ]);
        let series = adx(&input, 2).unwrap();

        // i=2: ATR 4.5, +DM avg 1.0, -DM avg 1.5 => DX = 0.5/2.5*100 = 20
        // i=3: ATR 5.0, +DM avg 0.5, -DM avg 1.5 => DX = 1/2*100 = 50
        assert_eq!(series[..3], [None, None, None]);
        assert_close(series[3], 35.0);
    }

    #[test]
    fn adx_result_range() {
        let rows: Vec<_> = (0..100)
            .map(|i| {
                let base = 50.0 + (i as f64 * 0.3).sin() * 10.0;
                (base + 1.0, base - 1.0, base + 0.5, 10.0)
            })
            .collect();
        for v in adx(&bars(&rows), 14).unwrap().into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "ADX {v} out of [0,100] range");
        }
    }
}
