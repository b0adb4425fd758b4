// =============================================================================
// Broker collaborator: order placement seam
// =============================================================================
//
// The trader only ever places one kind of order: a market order for the
// intraday product, valid for the day.  Those flags are fixed here rather than
// configurable.
// =============================================================================

pub mod paper;
pub mod upstox;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::Side;

pub use paper::PaperBroker;
pub use upstox::UpstoxBroker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
}

/// Intraday (MIS) positions are squared off by the broker at session end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Product {
    #[serde(rename = "I")]
    Intraday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Validity {
    Day,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub instrument_key: String,
    pub side: Side,
    pub quantity: u32,
    pub order_type: OrderType,
    pub product: Product,
    pub validity: Validity,
}

impl OrderRequest {
    /// Market / intraday / day order.
    pub fn market(
        symbol: impl Into<String>,
        instrument_key: impl Into<String>,
        side: Side,
        quantity: u32,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            instrument_key: instrument_key.into(),
            side,
            quantity,
            order_type: OrderType::Market,
            product: Product::Intraday,
            validity: Validity::Day,
        }
    }
}

/// Broker acknowledgement of an accepted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: String,
    /// True when the fill was simulated locally.
    pub simulated: bool,
}

#[async_trait]
pub trait Broker: Send + Sync {
    /// Submit `request`.  Transport and broker-side rejections are returned
    /// as errors; callers propagate them unchanged.
    async fn place_order(&self, request: &OrderRequest) -> anyhow::Result<OrderConfirmation>;
}
