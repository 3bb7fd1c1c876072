//! pocket-core — node pool, relay and report coordination for PocketRelay.
//!
//! # Overview
//!
//! Applications hand a [`Relay`] to [`Pocket::send`] without knowing which
//! node will serve it. The core:
//!
//! - resolves the node pool for the relay's `(chain, net id)` through the
//!   dispatcher ([`client::DispatchClient`]) and caches it ([`NodeCache`])
//! - picks a node ([`NodeSelector`], uniform random by default)
//! - posts the relay envelope to it ([`client::RelayClient`])
//! - reports the node when it cannot be reached ([`client::ReportClient`])
//!
//! All HTTP goes through the [`Transport`] trait; `pocket-http` provides the
//! `reqwest` implementation.

pub mod abi;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod node;
pub mod notifier;
pub mod pocket;
pub mod relay;
pub mod report;
pub mod rpc;
pub mod selector;
pub mod transport;
pub mod wallet;

pub use abi::AbiCodec;
pub use cache::NodeCache;
pub use config::{Blockchain, Configuration, PocketConfig};
pub use error::{PocketError, TransportError};
pub use node::Node;
pub use notifier::Notifier;
pub use pocket::Pocket;
pub use relay::Relay;
pub use report::Report;
pub use rpc::{BlockTag, CallRequest, EthRpc, JsonRpcRequest, LogFilter, RpcParam};
pub use selector::{NodeSelector, RandomSelector};
pub use transport::{HttpMethod, HttpRequest, Transport};
pub use wallet::{Keystore, TransactionFields, Wallet};
