//! Gateway Messages
//!
//! Cross-window messages posted by hosted payment iframes. Only payloads
//! carrying the configured `message_source` tag are classified; everything
//! else on the page's message bus is ignored.

use serde_json::{Map, Value};

/// Key every gateway payload is tagged with
pub const SOURCE_KEY: &str = "message_source";

/// Status value reported by a completed payment
pub const PAID_STATUS: &str = "PAID";

/// What a tagged gateway message asks the adapter to do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayStatus {
    /// Issuer requires a 3-D Secure challenge
    Challenge { reference_id: String },

    /// Payment reached the gateway; forward to the execution endpoint
    Completed,

    /// Tagged, but nothing actionable yet
    Pending,
}

/// A classified gateway message with its original payload
#[derive(Clone, Debug, PartialEq)]
pub struct GatewayMessage {
    pub status: GatewayStatus,
    payload: Map<String, Value>,
}

impl GatewayMessage {
    /// Classify raw message data. Returns `None` unless it is an object tagged
    /// with `expected_source`.
    pub fn classify(data: &Value, expected_source: &str) -> Option<Self> {
        let payload = data.as_object()?;
        if payload.get(SOURCE_KEY).and_then(Value::as_str) != Some(expected_source) {
            return None;
        }

        let status = if is_truthy(payload.get("three_d_secured")) {
            GatewayStatus::Challenge {
                reference_id: payload
                    .get("cowpay_reference_id")
                    .map(form_value)
                    .unwrap_or_default(),
            }
        } else if is_truthy(payload.get("payment_gateway_reference_id"))
            || payload.get("payment_status").and_then(Value::as_str) == Some(PAID_STATUS)
        {
            GatewayStatus::Completed
        } else {
            GatewayStatus::Pending
        };

        Some(Self {
            status,
            payload: payload.clone(),
        })
    }

    pub fn reference_id(&self) -> Option<String> {
        self.payload
            .get("payment_gateway_reference_id")
            .filter(|v| is_truthy(Some(v)))
            .map(form_value)
    }

    /// Every payload entry as a form field, in payload order
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.payload
            .iter()
            .map(|(k, v)| (k.clone(), form_value(v)))
            .collect()
    }
}

/// Render a JSON value the way a browser stringifies it into form data
fn form_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".into(),
        other => other.to_string(),
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}
