//! Relay delivery to a single node.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::error::PocketError;
use crate::node::Node;
use crate::relay::Relay;
use crate::rpc::JsonRpcError;
use crate::transport::{execute_with_timeout, HttpRequest, Transport};

/// Sends one relay to one node, exactly one HTTP call, no retry.
#[derive(Clone)]
pub struct RelayClient {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl RelayClient {
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Post `relay` to `node` and classify the answer.
    ///
    /// Transport failures come back as [`PocketError::Transport`]; a node
    /// answering with a JSON-RPC error comes back as
    /// [`PocketError::Application`].
    pub async fn submit(&self, relay: &Relay, node: &Node) -> Result<String, PocketError> {
        relay.validate().map_err(PocketError::InvalidRelay)?;

        let body = serde_json::to_value(relay.envelope())
            .map_err(|e| PocketError::InvalidRelay(e.to_string()))?;
        let url = node.relay_url();
        tracing::debug!(node = %node, rest = relay.is_rest(), "submitting relay");

        let raw = execute_with_timeout(
            self.transport.as_ref(),
            HttpRequest::post_json(url, body),
            self.timeout,
        )
        .await?;

        classify_response(&raw)
    }
}

/// Interpret a 2xx relay response body.
///
/// - JSON object with `"error"` → [`PocketError::Application`]
/// - JSON object with `"result"` → the result (strings unquoted)
/// - anything else → the raw body
pub fn classify_response(raw: &str) -> Result<String, PocketError> {
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(raw) else {
        return Ok(raw.to_string());
    };

    if let Some(error) = object.get("error") {
        if !error.is_null() {
            return Err(PocketError::Application(error_message(error)));
        }
    }

    match object.get("result") {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => Ok(raw.to_string()),
    }
}

fn error_message(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        other => serde_json::from_value::<JsonRpcError>(other.clone())
            .map(|e| e.message)
            .unwrap_or_else(|_| other.to_string()),
    }
}
