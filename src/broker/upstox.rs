// =============================================================================
// Upstox REST order adapter: bearer-token authenticated
// =============================================================================
//
// Only the order-placement call is implemented.  The access token is never
// logged or serialised.
// =============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use tracing::{debug, instrument};

use super::{Broker, OrderConfirmation, OrderRequest};

/// Live broker client for the Upstox v2 REST API.
#[derive(Clone)]
pub struct UpstoxBroker {
    base_url: String,
    client: reqwest::Client,
}

impl UpstoxBroker {
    /// Create a client for `base_url` (e.g. `https://api.upstox.com/v2`).
    pub fn new(base_url: impl Into<String>, access_token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .context("access token contains invalid header characters")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "UpstoxBroker initialised");

        Ok(Self { base_url, client })
    }
}

#[async_trait]
impl Broker for UpstoxBroker {
    /// POST /order/place
    #[instrument(skip(self, request), fields(symbol = %request.symbol, side = %request.side), name = "upstox::place_order")]
    async fn place_order(&self, request: &OrderRequest) -> Result<OrderConfirmation> {
        let url = format!("{}/order/place", self.base_url);

        let resp = self
            .client
            .post(&url)
            .json(&order_body(request))
            .send()
            .await
            .context("POST /order/place request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse order response")?;

        let confirmation = parse_order_response(status.as_u16(), &body)?;
        debug!(order_id = %confirmation.order_id, "order placed successfully");
        Ok(confirmation)
    }
}

/// JSON body for a place-order request.
fn order_body(request: &OrderRequest) -> serde_json::Value {
    serde_json::json!({
        "quantity": request.quantity,
        "product": request.product,
        "validity": request.validity,
        "price": 0,
        "tag": "vwap-scalper",
        "instrument_token": request.instrument_key,
        "order_type": request.order_type,
        "transaction_type": request.side,
        "disclosed_quantity": 0,
        "trigger_price": 0,
        "is_amo": false,
    })
}

/// Expected success shape: `{ "status": "success", "data": { "order_id": "..." } }`.
fn parse_order_response(status: u16, body: &serde_json::Value) -> Result<OrderConfirmation> {
    let ok = (200..300).contains(&status) && body["status"].as_str() == Some("success");
    if !ok {
        let message = body["errors"]
            .as_array()
            .and_then(|errs| errs.first())
            .and_then(|e| e["message"].as_str())
            .unwrap_or("unknown error");
        anyhow::bail!("Upstox POST /order/place returned {status}: {message}");
    }

    let order_id = body["data"]["order_id"]
        .as_str()
        .context("order response missing data.order_id")?
        .to_string();

    Ok(OrderConfirmation {
        order_id,
        simulated: false,
    })
}

impl std::fmt::Debug for UpstoxBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstoxBroker")
            .field("access_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::Side;

    #[test]
    fn body_carries_fixed_flags() {
        let req = OrderRequest::market("RELIANCE", "NSE_EQ|INE002A01018", Side::Buy, 10);
        let body = order_body(&req);
        assert_eq!(body["transaction_type"], "BUY");
        assert_eq!(body["order_type"], "MARKET");
        assert_eq!(body["product"], "I");
        assert_eq!(body["validity"], "DAY");
        assert_eq!(body["quantity"], 10);
        assert_eq!(body["instrument_token"], "NSE_EQ|INE002A01018");
    }

    #[test]
    fn parses_success() {
        let body = json!({ "status": "success", "data": { "order_id": "240301000012345" } });
        let conf = parse_order_response(200, &body).unwrap();
        assert_eq!(conf.order_id, "240301000012345");
        assert!(!conf.simulated);
    }

    #[test]
    fn surfaces_broker_rejection() {
        let body = json!({
            "status": "error",
            "errors": [{ "errorCode": "UDAPI100050", "message": "Invalid token used to access API" }]
        });
        let err = parse_order_response(401, &body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Upstox POST /order/place returned 401: Invalid token used to access API"
        );
    }

    #[test]
    fn success_without_order_id_is_error() {
        let body = json!({ "status": "success", "data": {} });
        assert!(parse_order_response(200, &body).is_err());
    }

    #[test]
    fn debug_redacts_token() {
        let broker = UpstoxBroker::new("https://api.upstox.com/v2/", "secret-token").unwrap();
        let dbg = format!("{broker:?}");
        assert!(!dbg.contains("secret-token"));
        assert!(dbg.contains("https://api.upstox.com/v2\""));
    }
}
