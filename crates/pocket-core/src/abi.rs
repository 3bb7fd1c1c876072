//! Contract call encoding, provided by an external ABI codec.

use serde_json::Value;

use crate::error::PocketError;

/// Opaque string transforms applied around a contract-call relay.
pub trait AbiCodec: Send + Sync {
    /// Encode a call to `function_json` (one ABI entry) with comma-separated
    /// `params_csv`; returns `0x`-prefixed calldata.
    fn encode(&self, function_json: &str, params_csv: &str) -> Result<String, PocketError>;

    /// Decode the hex return data of `function_json`.
    fn decode(&self, hex: &str, function_json: &str) -> Result<Vec<Value>, PocketError>;
}
