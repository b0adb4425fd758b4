// =============================================================================
// Money Flow Index (MFI)
// =============================================================================
//
// A volume-weighted RSI:
//   1. tp_t  = (high + low + close) / 3,  raw money flow rmf_t = tp_t * volume_t
//   2. rmf_t counts as positive flow when tp_t > tp_{t-1}, negative flow when
//      tp_t < tp_{t-1}, and as neither when unchanged.
//   3. ratio = sum(positive, length) / sum(negative, length)
//   4. MFI   = 100 - 100 / (1 + ratio)
//
// The first bar has no predecessor so it carries no flow; the first defined
// value is at index `length`.  A window with no negative flow saturates at 100.
// =============================================================================

use super::{check_len, check_period, rolling_sum, saturating_oscillator, typical_price, Result, Series};
use crate::market_data::Bar;

const NAME: &str = "mfi";

pub fn mfi(bars: &[Bar], length: usize) -> Result<Series> {
    check_period(NAME, length)?;
    check_len(NAME, length + 1, bars.len())?;

    let tp: Vec<f64> = bars.iter().map(typical_price).collect();

    let mut positive = vec![0.0; bars.len()];
    let mut negative = vec![0.0; bars.len()];
    for i in 1..bars.len() {
        let flow = tp[i] * bars[i].volume;
        if tp[i] > tp[i - 1] {
            positive[i] = flow;
        } else if tp[i] < tp[i - 1] {
            negative[i] = flow;
        }
    }

    let pos_sum = rolling_sum(&positive, length, 1);
    let neg_sum = rolling_sum(&negative, length, 1);

    Ok(pos_sum
        .into_iter()
        .zip(neg_sum)
        .map(|(p, n)| Some(saturating_oscillator(p?, n?)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{assert_close, bars};
    use crate::indicators::IndicatorError;

    fn flat(n: usize) -> Vec<Bar> {
        bars(&vec![(101.0, 99.0, 100.0, 10.0); n])
    }

    #[test]
    fn mfi_insufficient_data() {
        assert_eq!(
            mfi(&flat(14), 14),
            Err(IndicatorError::InsufficientData {
                indicator: "mfi",
                required: 15,
                available: 14
            })
        );
    }

    #[test]
    fn mfi_warm_up_is_none() {
        let series = mfi(&flat(20), 5).unwrap();
        assert_eq!(series.len(), 20);
        assert!(series[..5].iter().all(Option::is_none));
        assert!(series[5..].iter().all(Option::is_some));
    }

    #[test]
    fn mfi_flat_market_saturates() {
        for v in mfi(&flat(20), 5).unwrap().into_iter().flatten() {
            assert_eq!(v, 100.0);
        }
    }

    #[test]
    fn mfi_known_values() {
        // tp: 10, 12, 11, 13 ; volume 1, 2, 3, 4
        // flows: -, +24, -33, +52
        let input = bars(&[
            (10.0, 10.0, 10.0, 1.0),
            (12.0, 12.0, 12.0, 2.0),
            (11.0, 11.0, 11.0, 3.0),
            (13.0, 13.0, 13.0, 4.0),
        ]);
        let series = mfi(&input, 2).unwrap();
        assert_eq!(series[..2], [None, None]);
        // window {1, 2}: ratio 24 / 33
        assert_close(series[2], 100.0 - 100.0 / (1.0 + 24.0 / 33.0));
        // window {2, 3}: ratio 52 / 33
        assert_close(series[3], 100.0 - 100.0 / (1.0 + 52.0 / 33.0));
    }

    #[test]
    fn mfi_falling_market_is_zero() {
        let rows: Vec<_> = (0..20)
            .map(|i| {
                let p = 200.0 - f64::from(i);
                (p + 1.0, p - 1.0, p, 50.0)
            })
            .collect();
        for v in mfi(&bars(&rows), 14).unwrap().into_iter().flatten() {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn mfi_result_range() {
        let rows: Vec<_> = (0..60)
            .map(|i| {
                let p = 50.0 + (f64::from(i) * 0.4).sin() * 5.0;
                (p + 1.0, p - 1.0, p, 10.0 + f64::from(i % 7))
            })
            .collect();
        for v in mfi(&bars(&rows), 14).unwrap().into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "MFI {v} out of range");
        }
    }
}
