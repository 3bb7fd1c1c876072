//! Node pool discovery.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::config::{Blockchain, Configuration};
use crate::error::PocketError;
use crate::node::Node;
use crate::transport::{execute_with_timeout, HttpRequest, Transport};

/// Path of the dispatch endpoint, relative to the dispatcher base URL.
pub const DISPATCH_PATH: &str = "/v1/dispatch";

#[derive(Debug, Serialize)]
struct DispatchRequest<'a> {
    #[serde(rename = "DevID")]
    dev_id: &'a str,
    #[serde(rename = "Blockchains")]
    blockchains: &'a [Blockchain],
}

/// Fetches the node pool for every chain registered in a [`Configuration`].
#[derive(Clone)]
pub struct DispatchClient {
    transport: Arc<dyn Transport>,
    url: String,
    timeout: Duration,
}

impl DispatchClient {
    pub fn new(transport: Arc<dyn Transport>, dispatch_url: &str, timeout: Duration) -> Self {
        Self {
            transport,
            url: format!("{}{DISPATCH_PATH}", dispatch_url.trim_end_matches('/')),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Ask the dispatcher for nodes. Does not touch the configuration's pool.
    pub async fn fetch_nodes(&self, config: &Configuration) -> Result<Vec<Node>, PocketError> {
        let chains = config.chains();
        let body = serde_json::to_value(DispatchRequest {
            dev_id: config.dev_id(),
            blockchains: &chains,
        })
        .map_err(|e| PocketError::Config(e.to_string()))?;

        tracing::debug!(url = %self.url, chains = chains.len(), "requesting node pool");
        let raw = execute_with_timeout(
            self.transport.as_ref(),
            HttpRequest::post_json(&self.url, body),
            self.timeout,
        )
        .await?;

        let nodes = parse_dispatch_response(&raw)?;
        tracing::debug!(nodes = nodes.len(), "dispatch response parsed");
        Ok(nodes)
    }
}

/// Turn a dispatcher response into a flat node list.
///
/// The response is a JSON array whose elements are either
/// `{"ETH|4": ["1.2.3.4:8080", ...], ...}` or
/// `{"name": "ETH", "netid": "4", "ips": [...]}`.
pub fn parse_dispatch_response(raw: &str) -> Result<Vec<Node>, PocketError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| PocketError::NodePoolParse(format!("invalid JSON: {e}")))?;
    let records = value
        .as_array()
        .ok_or_else(|| PocketError::NodePoolParse("expected a JSON array".into()))?;

    let mut nodes = Vec::new();
    for record in records {
        let object = record.as_object().ok_or_else(|| {
            PocketError::NodePoolParse(format!("expected an object, got {record}"))
        })?;

        if object.contains_key("ips") {
            let name = string_field(object, "name")?;
            let net_id = string_field(object, "netid")?;
            push_addresses(&mut nodes, name, net_id, &object["ips"])?;
            continue;
        }

        for (key, addresses) in object {
            let (chain, net_id) = key.split_once('|').ok_or_else(|| {
                PocketError::NodePoolParse(format!("malformed chain key '{key}'"))
            })?;
            push_addresses(&mut nodes, chain, net_id, addresses)?;
        }
    }

    if nodes.is_empty() {
        return Err(PocketError::NodePoolParse("dispatch returned no nodes".into()));
    }
    Ok(nodes)
}

fn string_field<'a>(
    object: &'a serde_json::Map<String, Value>,
    key: &str,
) -> Result<&'a str, PocketError> {
    object
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| PocketError::NodePoolParse(format!("missing '{key}'")))
}

fn push_addresses(
    nodes: &mut Vec<Node>,
    chain: &str,
    net_id: &str,
    addresses: &Value,
) -> Result<(), PocketError> {
    let addresses = addresses.as_array().ok_or_else(|| {
        PocketError::NodePoolParse(format!("addresses for {chain}|{net_id} are not a list"))
    })?;
    for address in addresses {
        let address = address.as_str().ok_or_else(|| {
            PocketError::NodePoolParse(format!("non-string address for {chain}|{net_id}"))
        })?;
        nodes.push(Node::new(chain, net_id, address)?);
    }
    Ok(())
}
