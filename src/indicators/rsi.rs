// =============================================================================
// Relative Strength Index (RSI)
// =============================================================================
//
// Step 1: gain_t = max(close_t - close_{t-1}, 0)
//          loss_t = max(close_{t-1} - close_t, 0)
// Step 2: Average gain / loss with the EMA recurrence, centre of mass
//          length - 1 (alpha = 1 / length), seeded on the first delta.
// Step 3: RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// avg_loss == 0 saturates at 100, including a completely flat series.
// Values before index `length` are `None` while the averages warm up.
// =============================================================================

use super::ema::ema_com;
use super::{check_len, check_period, saturating_oscillator, Result, Series};

const NAME: &str = "rsi";

/// Compute the RSI series for `closes`.
///
/// Requires `length + 1` closes (`length` deltas).
pub fn rsi(closes: &[f64], length: usize) -> Result<Series> {
    check_period(NAME, length)?;
    check_len(NAME, length + 1, closes.len())?;

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    let com = (length - 1) as f64;
    let avg_gain = ema_com(&gains, com)?;
    let avg_loss = ema_com(&losses, com)?;

    // avg_*[j] belongs to close index j + 1.
    let mut out = vec![None; closes.len()];
    for i in length..closes.len() {
        out[i] = match (avg_gain[i - 1], avg_loss[i - 1]) {
            (Some(g), Some(l)) => Some(saturating_oscillator(g, l)),
            _ => None,
        };
    }
    Ok(out)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorError;

    #[test]
    fn rsi_insufficient_data() {
        let closes: Vec<f64> = (1..=14).map(f64::from).collect();
        assert_eq!(
            rsi(&closes, 14),
            Err(IndicatorError::InsufficientData {
                indicator: "rsi",
                required: 15,
                available: 14
            })
        );
    }

    #[test]
    fn rsi_period_zero() {
        assert!(matches!(
            rsi(&[1.0, 2.0], 0),
            Err(IndicatorError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn rsi_warm_up_is_none() {
        let closes: Vec<f64> = (1..=20).map(f64::from).collect();
        let series = rsi(&closes, 7).unwrap();
        assert_eq!(series.len(), closes.len());
        assert!(series[..7].iter().all(Option::is_none));
        assert!(series[7..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (1..=30).map(f64::from).collect();
        let series = rsi(&closes, 14).unwrap();
        for v in series.iter().flatten() {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(f64::from).collect();
        let series = rsi(&closes, 14).unwrap();
        for v in series.iter().flatten() {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market_saturates() {
        // avg_gain = avg_loss = 0 falls under the avg_loss == 0 rule.
        let series = rsi(&[100.0; 30], 14).unwrap();
        for v in series.iter().flatten() {
            assert_eq!(*v, 100.0);
        }
    }

    #[test]
    fn rsi_known_values() {
        // length 2 => alpha 0.5
        // deltas: +2, -1, +1
        // avg_gain: 2, 1, 1      avg_loss: 0, 0.5, 0.25
        let series = rsi(&[10.0, 12.0, 11.0, 12.0], 2).unwrap();
        assert_eq!(series[0], None);
        assert_eq!(series[1], None);
        // RS = 1 / 0.5 = 2 => 100 - 100/3
        assert!((series[2].unwrap() - (100.0 - 100.0 / 3.0)).abs() < 1e-10);
        // RS = 1 / 0.25 = 4 => 80
        assert!((series[3].unwrap() - 80.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let series = rsi(&closes, 14).unwrap();
        for &v in series.iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }
}
