use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{Broker, OrderConfirmation, OrderRequest};

/// Demo-mode broker: every order is accepted and filled locally, no request
/// leaves the process.
#[derive(Debug, Default)]
pub struct PaperBroker {
    orders: RwLock<Vec<(String, OrderRequest)>>,
}

impl PaperBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders accepted so far, oldest first, with their simulated ids.
    pub fn orders(&self) -> Vec<(String, OrderRequest)> {
        self.orders.read().clone()
    }
}

#[async_trait]
impl Broker for PaperBroker {
    async fn place_order(&self, request: &OrderRequest) -> anyhow::Result<OrderConfirmation> {
        let order_id = Uuid::new_v4().to_string();
        info!(
            order_id = %order_id,
            symbol = %request.symbol,
            side = %request.side,
            quantity = request.quantity,
            "demo fill"
        );
        self.orders.write().push((order_id.clone(), request.clone()));
        Ok(OrderConfirmation {
            order_id,
            simulated: true,
        })
    }
}
