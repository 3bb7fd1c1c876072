//! Typed JSON-RPC 2.0 payloads carried as opaque relay data.
//!
//! Callers build a [`JsonRpcRequest`] (by hand or through [`EthRpc`]) and
//! turn it into the pre-serialized `data` string of a
//! [`Relay`](crate::relay::Relay).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PocketError;

/// JSON-RPC request ID — string, number, or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(u64),
    String(String),
    Null,
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A single JSON-RPC parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcParam {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    Array(Vec<RpcParam>),
    Object(BTreeMap<String, RpcParam>),
}

impl From<&str> for RpcParam {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for RpcParam {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<u64> for RpcParam {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i64> for RpcParam {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<bool> for RpcParam {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<RpcParam>> From<Vec<T>> for RpcParam {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, RpcParam>> for RpcParam {
    fn from(map: BTreeMap<String, RpcParam>) -> Self {
        Self::Object(map)
    }
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<RpcParam>,
    pub id: RpcId,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(id: u64, method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
            id: RpcId::Number(id),
        }
    }

    /// Serialize into the opaque `data` string of a relay.
    pub fn to_relay_data(&self) -> Result<String, PocketError> {
        serde_json::to_string(self)
            .map_err(|e| PocketError::InvalidRelay(format!("failed to serialize request: {e}")))
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

/// Block tag or number accepted by state-reading methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    Earliest,
    Pending,
    Number(u64),
}

impl From<&BlockTag> for RpcParam {
    fn from(tag: &BlockTag) -> Self {
        match tag {
            BlockTag::Latest => "latest".into(),
            BlockTag::Earliest => "earliest".into(),
            BlockTag::Pending => "pending".into(),
            BlockTag::Number(n) => format!("{n:#x}").into(),
        }
    }
}

/// Message call fields for `eth_call` / `eth_estimateGas`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<String>,
    pub to: String,
    pub data: Option<String>,
    pub value: Option<String>,
    pub gas: Option<String>,
}

impl From<&CallRequest> for RpcParam {
    fn from(call: &CallRequest) -> Self {
        let mut map = BTreeMap::new();
        map.insert("to".to_string(), RpcParam::from(call.to.as_str()));
        let optional = [
            ("from", &call.from),
            ("data", &call.data),
            ("value", &call.value),
            ("gas", &call.gas),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                map.insert(key.to_string(), RpcParam::from(v.as_str()));
            }
        }
        RpcParam::Object(map)
    }
}

/// Filter for `eth_getLogs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub from_block: Option<BlockTag>,
    pub to_block: Option<BlockTag>,
    pub address: Option<String>,
    pub topics: Vec<String>,
    pub block_hash: Option<String>,
}

impl From<&LogFilter> for RpcParam {
    fn from(filter: &LogFilter) -> Self {
        let mut map = BTreeMap::new();
        if let Some(tag) = &filter.from_block {
            map.insert("fromBlock".to_string(), tag.into());
        }
        if let Some(tag) = &filter.to_block {
            map.insert("toBlock".to_string(), tag.into());
        }
        if let Some(address) = &filter.address {
            map.insert("address".to_string(), address.as_str().into());
        }
        if !filter.topics.is_empty() {
            map.insert("topics".to_string(), filter.topics.clone().into());
        }
        if let Some(hash) = &filter.block_hash {
            map.insert("blockHash".to_string(), hash.as_str().into());
        }
        RpcParam::Object(map)
    }
}

/// Typed builders for the Ethereum JSON-RPC methods most callers relay.
pub struct EthRpc;

impl EthRpc {
    pub fn block_number(id: u64) -> JsonRpcRequest {
        JsonRpcRequest::new(id, "eth_blockNumber", vec![])
    }

    pub fn get_balance(id: u64, address: &str, block: &BlockTag) -> JsonRpcRequest {
        JsonRpcRequest::new(id, "eth_getBalance", vec![address.into(), block.into()])
    }

    pub fn get_transaction_count(id: u64, address: &str, block: &BlockTag) -> JsonRpcRequest {
        JsonRpcRequest::new(
            id,
            "eth_getTransactionCount",
            vec![address.into(), block.into()],
        )
    }

    pub fn get_code(id: u64, address: &str, block: &BlockTag) -> JsonRpcRequest {
        JsonRpcRequest::new(id, "eth_getCode", vec![address.into(), block.into()])
    }

    pub fn call(id: u64, call: &CallRequest, block: &BlockTag) -> JsonRpcRequest {
        JsonRpcRequest::new(id, "eth_call", vec![call.into(), block.into()])
    }

    pub fn estimate_gas(id: u64, call: &CallRequest) -> JsonRpcRequest {
        JsonRpcRequest::new(id, "eth_estimateGas", vec![call.into()])
    }

    pub fn send_raw_transaction(id: u64, raw_tx_hex: &str) -> JsonRpcRequest {
        JsonRpcRequest::new(id, "eth_sendRawTransaction", vec![raw_tx_hex.into()])
    }

    pub fn get_transaction_receipt(id: u64, tx_hash: &str) -> JsonRpcRequest {
        JsonRpcRequest::new(id, "eth_getTransactionReceipt", vec![tx_hash.into()])
    }

    pub fn get_logs(id: u64, filter: &LogFilter) -> JsonRpcRequest {
        JsonRpcRequest::new(id, "eth_getLogs", vec![filter.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serialization() {
        let req = EthRpc::block_number(1);
        let json = req.to_relay_data().unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"method\":\"eth_blockNumber\""));
        assert!(json.contains("\"params\":[]"));
    }

    #[test]
    fn params_serialize_untagged() {
        let req = EthRpc::get_balance(7, "0xabc", &BlockTag::Number(255));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["params"], json!(["0xabc", "0xff"]));
        assert_eq!(value["id"], json!(7));
    }

    #[test]
    fn call_request_skips_absent_fields() {
        let call = CallRequest {
            to: "0xto".into(),
            data: Some("0xdeadbeef".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(EthRpc::call(1, &call, &BlockTag::Latest)).unwrap();
        assert_eq!(
            value["params"],
            json!([{"to": "0xto", "data": "0xdeadbeef"}, "latest"])
        );
    }

    #[test]
    fn log_filter_uses_camel_case_keys() {
        let filter = LogFilter {
            from_block: Some(BlockTag::Number(16)),
            to_block: Some(BlockTag::Latest),
            topics: vec!["0xtopic".into()],
            ..Default::default()
        };
        let value = serde_json::to_value(EthRpc::get_logs(1, &filter)).unwrap();
        assert_eq!(
            value["params"][0],
            json!({"fromBlock": "0x10", "toBlock": "latest", "topics": ["0xtopic"]})
        );
    }

    #[test]
    fn error_object_without_code() {
        let err: JsonRpcError = serde_json::from_value(json!({"message": "bad params"})).unwrap();
        assert_eq!(err.code, 0);
        assert_eq!(err.message, "bad params");
    }
}
