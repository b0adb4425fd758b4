// =============================================================================
// Risk: fixed-percentage stop-loss / take-profit brackets
// =============================================================================
//
// Levels are computed at entry and reported with the fill.  No exit orders
// are placed from them.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::Side;

fn default_stop_loss_pct() -> f64 {
    0.5
}

fn default_take_profit_pct() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskParams {
    /// Stop distance as a percentage of entry price.
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,

    /// Target distance as a percentage of entry price.
    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brackets {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Stop-loss and take-profit for an entry at `entry` on `side`.
///
/// Longs stop below and target above the entry; shorts mirror that.
pub fn sl_tp(entry: f64, side: Side, params: &RiskParams) -> Brackets {
    let sl_dist = entry * params.stop_loss_pct / 100.0;
    let tp_dist = entry * params.take_profit_pct / 100.0;

    match side {
        Side::Buy => Brackets {
            stop_loss: entry - sl_dist,
            take_profit: entry + tp_dist,
        },
        Side::Sell => Brackets {
            stop_loss: entry + sl_dist,
            take_profit: entry - tp_dist,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_brackets() {
        let b = sl_tp(200.0, Side::Buy, &RiskParams::default());
        assert!((b.stop_loss - 199.0).abs() < 1e-9);
        assert!((b.take_profit - 202.0).abs() < 1e-9);
    }

    #[test]
    fn short_brackets_mirror_long() {
        let params = RiskParams {
            stop_loss_pct: 0.25,
            take_profit_pct: 0.75,
        };
        let b = sl_tp(400.0, Side::Sell, &params);
        assert!((b.stop_loss - 401.0).abs() < 1e-9);
        assert!((b.take_profit - 397.0).abs() < 1e-9);
    }
}
