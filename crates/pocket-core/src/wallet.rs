//! Wallet credentials and the keystore that owns them.
//!
//! Key generation, signing and encrypted persistence live outside this
//! crate; the core only forwards the signed transaction it gets back.

use serde::{Deserialize, Serialize};

use crate::error::PocketError;

/// Key material for one account on one chain.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub address: String,
    pub private_key: String,
    pub network: String,
    pub net_id: String,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .field("network", &self.network)
            .field("net_id", &self.net_id)
            .finish()
    }
}

/// Fields of a transaction to sign. Values are hex quantities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFields {
    pub nonce: String,
    pub to: String,
    pub value: String,
    pub gas_price: String,
    pub gas_limit: String,
    #[serde(default)]
    pub data: String,
}

/// Wallet creation, import and signing.
pub trait Keystore: Send + Sync {
    fn create_wallet(&self, chain: &str, net_id: &str) -> Result<Wallet, PocketError>;

    fn import_wallet(
        &self,
        private_key: &str,
        chain: &str,
        net_id: &str,
    ) -> Result<Wallet, PocketError>;

    /// Sign `tx` and return the raw transaction as hex.
    fn sign(&self, tx: &TransactionFields, private_key: &str) -> Result<String, PocketError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_private_key() {
        let wallet = Wallet {
            address: "0xabc".into(),
            private_key: "supersecret".into(),
            network: "ETH".into(),
            net_id: "4".into(),
        };
        let out = format!("{wallet:?}");
        assert!(out.contains("0xabc"));
        assert!(!out.contains("supersecret"));
    }
}
