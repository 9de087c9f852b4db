//! Order-lifecycle events delivered over the account WebSocket stream.
//!
//! The exchange pushes `{"data": {"e": <tag>, "c": <clientId>, "S": <side>, ...}}`
//! frames on the `account.orderUpdate` channel. Only a fixed set of tags is
//! recognized; anything else decodes to `Unrecognized` so a consumer can log
//! and drop it instead of failing the stream.

use crate::order::Side;
use serde_json::Value;

/// A single order-lifecycle update.
///
/// Only `Fill` drives the grid logic; the other lifecycle tags are decoded
/// so consumers can observe them, but carry no behavior today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderUpdate {
    Accepted { client_id: Option<i64> },
    Cancelled { client_id: Option<i64> },
    Expired { client_id: Option<i64> },
    Fill(FillEvent),
    /// Event tag the decoder does not know about.
    Unrecognized { kind: String },
}

/// Payload of an `orderFill` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillEvent {
    /// Client order id of the filled order; `None` when the order was
    /// placed without one.
    pub client_id: Option<i64>,
    /// Side of the filled order.
    pub side: Side,
}

impl OrderUpdate {
    /// Decode an update from the `data` payload of a stream frame.
    ///
    /// Returns `None` when the payload is not an order event at all, or
    /// when a recognized tag is missing a required field (a fill without a
    /// side is useless downstream).
    pub fn from_data(data: &Value) -> Option<Self> {
        let kind = data.get("e")?.as_str()?;
        let client_id = decode_client_id(data);

        match kind {
            "orderAccepted" => Some(Self::Accepted { client_id }),
            "orderCancelled" => Some(Self::Cancelled { client_id }),
            "orderExpired" => Some(Self::Expired { client_id }),
            "orderFill" => {
                let side = data.get("S")?.as_str()?.parse().ok()?;
                Some(Self::Fill(FillEvent { client_id, side }))
            }
            other => Some(Self::Unrecognized {
                kind: other.to_string(),
            }),
        }
    }

    /// Whether this update carries one of the recognized lifecycle tags.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized { .. })
    }
}

/// The `c` field arrives as a JSON number or a numeric string depending
/// on the endpoint revision; accept both.
fn decode_client_id(data: &Value) -> Option<i64> {
    match data.get("c") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}
