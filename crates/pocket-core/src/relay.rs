//! Relay requests and their wire envelope.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::PocketError;
use crate::rpc::JsonRpcRequest;
use crate::transport::HttpMethod;

/// One request to forward to whichever node serves `(chain, net_id)`.
///
/// A relay is either JSON-RPC (`data` carries the serialized call) or
/// REST-style (`http_method` + `path`, optionally with query and headers).
/// It never refers to a node; one is picked per send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relay {
    pub chain: String,
    pub net_id: String,
    pub data: String,
    pub dev_id: String,
    pub http_method: Option<HttpMethod>,
    pub path: Option<String>,
    pub query_params: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
}

impl Relay {
    /// A JSON-RPC relay with a pre-serialized payload.
    pub fn new(
        chain: impl Into<String>,
        net_id: impl Into<String>,
        data: impl Into<String>,
        dev_id: impl Into<String>,
    ) -> Self {
        Self {
            chain: chain.into(),
            net_id: net_id.into(),
            data: data.into(),
            dev_id: dev_id.into(),
            http_method: None,
            path: None,
            query_params: BTreeMap::new(),
            headers: BTreeMap::new(),
        }
    }

    /// A JSON-RPC relay built from a typed request.
    pub fn json_rpc(
        chain: impl Into<String>,
        net_id: impl Into<String>,
        dev_id: impl Into<String>,
        request: &JsonRpcRequest,
    ) -> Result<Self, PocketError> {
        Ok(Self::new(chain, net_id, request.to_relay_data()?, dev_id))
    }

    /// A REST-style relay.
    pub fn rest(
        chain: impl Into<String>,
        net_id: impl Into<String>,
        dev_id: impl Into<String>,
        method: HttpMethod,
        path: impl Into<String>,
    ) -> Self {
        let mut relay = Self::new(chain, net_id, String::new(), dev_id);
        relay.http_method = Some(method);
        relay.path = Some(path.into());
        relay
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Request body for REST relays that carry one.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    /// Returns `true` if this is a REST-style relay.
    pub fn is_rest(&self) -> bool {
        self.http_method.is_some() && self.path.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// Chain and developer id must be set, and there must be something to
    /// send: a payload or a REST method + path.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Like [`is_valid`](Self::is_valid), with the reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.chain.is_empty() {
            return Err("chain is empty".into());
        }
        if self.dev_id.is_empty() {
            return Err("dev id is empty".into());
        }
        if self.data.is_empty() && !self.is_rest() {
            return Err("neither data nor HTTP method and path are set".into());
        }
        Ok(())
    }

    /// The body posted to a node's relay endpoint.
    pub fn envelope(&self) -> RelayEnvelope<'_> {
        let rest = self.is_rest();
        RelayEnvelope {
            blockchain: &self.chain,
            net_id: &self.net_id,
            data: &self.data,
            dev_id: &self.dev_id,
            method: self.http_method.filter(|_| rest).map(|m| m.as_str()),
            path: self.path.as_deref().filter(|_| rest),
            query: (rest && !self.query_params.is_empty()).then_some(&self.query_params),
            headers: (rest && !self.headers.is_empty()).then_some(&self.headers),
        }
    }
}

/// Wire format of a relay.
#[derive(Debug, Serialize)]
pub struct RelayEnvelope<'a> {
    #[serde(rename = "Blockchain")]
    pub blockchain: &'a str,
    #[serde(rename = "NetID")]
    pub net_id: &'a str,
    #[serde(rename = "Data")]
    pub data: &'a str,
    #[serde(rename = "DevID")]
    pub dev_id: &'a str,
    #[serde(rename = "METHOD", skip_serializing_if = "Option::is_none")]
    pub method: Option<&'static str>,
    #[serde(rename = "PATH", skip_serializing_if = "Option::is_none")]
    pub path: Option<&'a str>,
    #[serde(rename = "QUERY", skip_serializing_if = "Option::is_none")]
    pub query: Option<&'a BTreeMap<String, String>>,
    #[serde(rename = "HEADERS", skip_serializing_if = "Option::is_none")]
    pub headers: Option<&'a BTreeMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::EthRpc;
    use serde_json::json;

    #[test]
    fn validity_rules() {
        assert!(Relay::new("ETH", "4", "{}", "D1").is_valid());
        assert!(!Relay::new("", "4", "{}", "D1").is_valid());
        assert!(!Relay::new("ETH", "4", "{}", "").is_valid());
        assert!(!Relay::new("ETH", "4", "", "D1").is_valid());

        assert!(Relay::rest("ETH", "4", "D1", HttpMethod::Get, "/v1/status").is_valid());
        assert!(!Relay::rest("ETH", "4", "D1", HttpMethod::Get, "").is_valid());

        let mut half_rest = Relay::new("ETH", "4", "", "D1");
        half_rest.path = Some("/v1/status".into());
        assert!(!half_rest.is_valid());
        half_rest.http_method = Some(HttpMethod::Get);
        assert!(half_rest.is_valid());
    }

    #[test]
    fn validate_explains_failure() {
        let err = Relay::new("ETH", "4", "{}", "").validate().unwrap_err();
        assert_eq!(err, "dev id is empty");
    }

    #[test]
    fn json_rpc_envelope() {
        let relay = Relay::new("ETH", "4", r#"{"method":"eth_blockNumber"}"#, "D1");
        let body = serde_json::to_value(relay.envelope()).unwrap();
        assert_eq!(
            body,
            json!({
                "Blockchain": "ETH",
                "NetID": "4",
                "Data": "{\"method\":\"eth_blockNumber\"}",
                "DevID": "D1"
            })
        );
    }

    #[test]
    fn json_rpc_constructor_carries_serialized_request() {
        let relay = Relay::json_rpc("ETH", "4", "D1", &EthRpc::block_number(7)).unwrap();
        assert!(relay.is_valid());
        assert!(!relay.is_rest());
        let data: serde_json::Value = serde_json::from_str(&relay.data).unwrap();
        assert_eq!(
            data,
            json!({"jsonrpc": "2.0", "method": "eth_blockNumber", "params": [], "id": 7})
        );
    }

    #[test]
    fn rest_envelope() {
        let relay = Relay::rest("TEZOS", "MAINNET", "D1", HttpMethod::Get, "/chains/main/blocks")
            .with_query("limit", "1")
            .with_header("Accept", "application/json");
        let body = serde_json::to_value(relay.envelope()).unwrap();
        assert_eq!(body["METHOD"], "GET");
        assert_eq!(body["PATH"], "/chains/main/blocks");
        assert_eq!(body["QUERY"], json!({"limit": "1"}));
        assert_eq!(body["HEADERS"], json!({"Accept": "application/json"}));
        assert_eq!(body["Data"], "");
    }
}
