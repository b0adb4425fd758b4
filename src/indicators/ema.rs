// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha  = 2 / (period + 1)          (span form)
//   alpha  = 1 / (1 + com)             (centre-of-mass form)
//   EMA_0  = close_0
//   EMA_t  = alpha * close_t + (1 - alpha) * EMA_{t-1}
//
// Seeding with the first close means every position is defined.
// =============================================================================

use super::{check_len, check_period, IndicatorError, Result, Series};

const NAME: &str = "ema";

/// EMA in the span parameterisation, `alpha = 2 / (period + 1)`.
pub fn ema(closes: &[f64], period: usize) -> Result<Series> {
    check_period(NAME, period)?;
    ema_with_alpha(closes, 2.0 / (period as f64 + 1.0))
}

/// EMA in the centre-of-mass parameterisation, `alpha = 1 / (1 + com)`.
pub fn ema_com(closes: &[f64], com: f64) -> Result<Series> {
    if !(com >= 0.0) || !com.is_finite() {
        return Err(IndicatorError::InvalidParameter {
            indicator: NAME,
            message: format!("centre of mass must be a finite value >= 0, got {com}"),
        });
    }
    ema_with_alpha(closes, 1.0 / (1.0 + com))
}

/// EMA recurrence for an explicit smoothing factor in `(0, 1]`.
pub fn ema_with_alpha(closes: &[f64], alpha: f64) -> Result<Series> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(IndicatorError::InvalidParameter {
            indicator: NAME,
            message: format!("alpha must be in (0, 1], got {alpha}"),
        });
    }
    check_len(NAME, 1, closes.len())?;

    Ok(smooth(closes, alpha).into_iter().map(Some).collect())
}

/// Raw recurrence over a non-empty slice.
fn smooth(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev = match values.first() {
        Some(&v) => v,
        None => return out,
    };
    out.push(prev);
    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_input() {
        assert_eq!(
            ema(&[], 5),
            Err(IndicatorError::InsufficientData {
                indicator: "ema",
                required: 1,
                available: 0
            })
        );
    }

    #[test]
    fn ema_period_zero() {
        assert!(matches!(
            ema(&[1.0, 2.0, 3.0], 0),
            Err(IndicatorError::InvalidPeriod { period: 0, .. })
        ));
    }

    #[test]
    fn ema_period_one_is_identity() {
        let closes = [3.0, 7.5, 1.25, 9.0, 4.0];
        let series = ema(&closes, 1).unwrap();
        let expected: Series = closes.iter().copied().map(Some).collect();
        assert_eq!(series, expected);
    }

    #[test]
    fn ema_known_values() {
        // alpha = 2 / 4 = 0.5
        let series = ema(&[10.0, 20.0, 30.0, 10.0], 3).unwrap();
        assert_eq!(series, vec![Some(10.0), Some(15.0), Some(22.5), Some(16.25)]);
    }

    #[test]
    fn ema_seeded_with_first_close() {
        let series = ema(&[42.0], 21).unwrap();
        assert_eq!(series, vec![Some(42.0)]);
    }

    #[test]
    fn ema_constant_series_stays_constant() {
        let series = ema(&[100.0; 50], 9).unwrap();
        assert!(series.iter().all(|v| *v == Some(100.0)));
    }

    #[test]
    fn ema_com_matches_alpha() {
        // com = 6 => alpha = 1/7, the RSI(7) smoothing.
        let closes: Vec<f64> = (1..=20).map(f64::from).collect();
        let by_com = ema_com(&closes, 6.0).unwrap();
        let by_alpha = ema_with_alpha(&closes, 1.0 / 7.0).unwrap();
        assert_eq!(by_com, by_alpha);
    }

    #[test]
    fn ema_rejects_bad_alpha() {
        assert!(ema_with_alpha(&[1.0], 0.0).is_err());
        assert!(ema_with_alpha(&[1.0], 1.5).is_err());
        assert!(ema_with_alpha(&[1.0], f64::NAN).is_err());
        assert!(ema_com(&[1.0], -1.0).is_err());
    }
}
