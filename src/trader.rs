// =============================================================================
// Trader: single-position state machine
// =============================================================================
//
//   Flat  --signal-->  InPosition(side)
//
// On the first signal while flat, one market order of fixed quantity is placed
// and the trader enters the position.  There is no transition back to Flat:
// the bot takes at most one trade per session and exits are left to the
// broker's intraday square-off.
// =============================================================================

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::broker::{Broker, OrderConfirmation, OrderRequest};
use crate::market_data::Bar;
use crate::risk::{sl_tp, Brackets, RiskParams};
use crate::strategy::{generate_signal, SignalParams};
use crate::types::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraderState {
    Flat,
    InPosition(Side),
}

/// What happened when a position was entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub side: Side,
    pub entry_price: f64,
    pub quantity: u32,
    pub brackets: Brackets,
    pub confirmation: OrderConfirmation,
}

/// Static settings the trader is constructed with.
#[derive(Debug, Clone)]
pub struct TraderSettings {
    pub symbol: String,
    pub instrument_key: String,
    pub quantity: u32,
    pub signal: SignalParams,
    pub risk: RiskParams,
}

pub struct Trader {
    broker: Arc<dyn Broker>,
    settings: TraderSettings,
    state: TraderState,
}

impl Trader {
    pub fn new(broker: Arc<dyn Broker>, settings: TraderSettings) -> Self {
        Self {
            broker,
            settings,
            state: TraderState::Flat,
        }
    }

    pub fn state(&self) -> TraderState {
        self.state
    }

    /// Evaluate the latest bar window and enter a position if warranted.
    ///
    /// Returns the entry when an order was placed.  Indicator and broker
    /// errors are propagated; a failed order leaves the trader flat.
    pub async fn on_new_candle(&mut self, bars: &[Bar]) -> Result<Option<EntryRecord>> {
        let signal = generate_signal(bars, &self.settings.signal)?;

        let side = match (signal, self.state) {
            (Some(side), TraderState::Flat) => side,
            (Some(side), TraderState::InPosition(held)) => {
                debug!(signal = %side, held = %held, "signal ignored, already in position");
                return Ok(None);
            }
            (None, _) => return Ok(None),
        };

        let entry_price = match bars.last() {
            Some(bar) => bar.close,
            None => return Ok(None),
        };
        let brackets = sl_tp(entry_price, side, &self.settings.risk);

        let request = OrderRequest::market(
            self.settings.symbol.clone(),
            self.settings.instrument_key.clone(),
            side,
            self.settings.quantity,
        );
        let confirmation = self.broker.place_order(&request).await?;

        self.state = TraderState::InPosition(side);

        info!(
            symbol = %self.settings.symbol,
            side = %side,
            entry_price,
            stop_loss = brackets.stop_loss,
            take_profit = brackets.take_profit,
            quantity = self.settings.quantity,
            order_id = %confirmation.order_id,
            "{side} @ {entry_price} SL:{:.2} TP:{:.2}",
            brackets.stop_loss,
            brackets.take_profit,
        );

        Ok(Some(EntryRecord {
            side,
            entry_price,
            quantity: self.settings.quantity,
            brackets,
            confirmation,
        }))
    }
}

impl std::fmt::Debug for Trader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trader")
            .field("broker", &"<dyn Broker>")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .finish()
    }
}
