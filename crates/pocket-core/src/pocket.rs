//! `Pocket` — the coordinator every application call goes through.
//!
//! One `send` runs strictly in order:
//! ```text
//! validate → cached nodes for (chain, net id) → [dispatch once if none]
//!          → select → relay → [report the node on transport failure]
//! ```
//! Nothing is retried. Concurrent sends may each refresh the pool; the last
//! refresh wins.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;

use crate::abi::AbiCodec;
use crate::client::{DispatchClient, RelayClient, ReportClient};
use crate::config::{Blockchain, Configuration, PocketConfig};
use crate::error::{PocketError, TransportError};
use crate::node::Node;
use crate::notifier::Notifier;
use crate::relay::Relay;
use crate::report::Report;
use crate::rpc::{BlockTag, CallRequest, EthRpc};
use crate::selector::{NodeSelector, RandomSelector};
use crate::transport::Transport;
use crate::wallet::{Keystore, TransactionFields, Wallet};

/// Client-side access point to the relay network.
///
/// Cloning is cheap; clones share configuration and node pool.
#[derive(Clone)]
pub struct Pocket {
    config: Arc<Configuration>,
    dispatch: DispatchClient,
    relay: RelayClient,
    report: ReportClient,
    selector: Arc<dyn NodeSelector>,
    next_id: Arc<AtomicU64>,
}

impl Pocket {
    pub fn new(
        dev_id: impl Into<String>,
        chains: Vec<Blockchain>,
        settings: PocketConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let config = Arc::new(Configuration::new(dev_id, chains, &settings));
        let timeout = config.request_timeout();
        Self {
            dispatch: DispatchClient::new(transport.clone(), &settings.dispatch_url, timeout),
            relay: RelayClient::new(transport.clone(), timeout),
            report: ReportClient::new(transport, &settings.dispatch_url, timeout),
            selector: Arc::new(RandomSelector),
            next_id: Arc::new(AtomicU64::new(1)),
            config,
        }
    }

    /// Replace the node selection strategy.
    pub fn with_selector(mut self, selector: Arc<dyn NodeSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Register another chain. Its nodes are fetched on the next dispatch.
    pub fn add_blockchain(&self, chain: impl Into<String>, net_id: impl Into<String>) -> bool {
        self.config.add_blockchain(Blockchain::new(chain, net_id))
    }

    /// Dispatch for all registered chains and replace the node pool.
    pub async fn retrieve_nodes(&self) -> Result<Vec<Node>, PocketError> {
        let fetched = self.dispatch.fetch_nodes(&self.config).await?;
        let fetched_len = fetched.len();
        let kept = self.config.nodes().replace(fetched, self.config.max_nodes());
        tracing::info!(fetched = fetched_len, kept = kept.len(), "node pool refreshed");
        Ok(kept)
    }

    /// Send `relay` to a node serving its chain and return the payload.
    pub async fn send(&self, relay: &Relay) -> Result<String, PocketError> {
        relay.validate().map_err(PocketError::InvalidRelay)?;

        let node = self.resolve_node(&relay.chain, &relay.net_id).await?;
        match self.relay.submit(relay, &node).await {
            Err(PocketError::Transport(err)) if err.is_node_fault() => {
                tracing::warn!(node = %node, error = %err, "relay failed, reporting node");
                self.report_failure(&node, &err).await;
                Err(PocketError::Transport(err))
            }
            other => other,
        }
    }

    /// Send a failure report to the dispatcher.
    pub async fn send_report(&self, report: &Report) -> Result<String, PocketError> {
        self.report.submit(report).await
    }

    /// Sign `tx` with `wallet` and relay it as `eth_sendRawTransaction`.
    pub async fn send_transaction(
        &self,
        keystore: &dyn Keystore,
        wallet: &Wallet,
        tx: &TransactionFields,
    ) -> Result<String, PocketError> {
        let raw_tx = keystore.sign(tx, &wallet.private_key)?;
        let request = EthRpc::send_raw_transaction(self.next_id(), &raw_tx);
        let relay = Relay::json_rpc(
            &wallet.network,
            &wallet.net_id,
            self.config.dev_id(),
            &request,
        )?;
        self.send(&relay).await
    }

    /// Encode a contract call, relay it as `eth_call` and decode the result.
    pub async fn call_contract(
        &self,
        codec: &dyn AbiCodec,
        chain: &str,
        net_id: &str,
        to: &str,
        function_json: &str,
        params_csv: &str,
    ) -> Result<Vec<Value>, PocketError> {
        let call = CallRequest {
            to: to.to_string(),
            data: Some(codec.encode(function_json, params_csv)?),
            ..Default::default()
        };
        let request = EthRpc::call(self.next_id(), &call, &BlockTag::Latest);
        let relay = Relay::json_rpc(chain, net_id, self.config.dev_id(), &request)?;
        let hex = self.send(&relay).await?;
        codec.decode(&hex, function_json)
    }

    /// [`send`](Self::send) on a background task; exactly one callback fires.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn send_with(
        &self,
        relay: Relay,
        on_success: impl FnOnce(String) + Send + 'static,
        on_error: impl FnOnce(PocketError) + Send + 'static,
    ) -> JoinHandle<()> {
        let pocket = self.clone();
        spawn_notified(Notifier::new(on_success, on_error), async move {
            pocket.send(&relay).await
        })
    }

    /// [`retrieve_nodes`](Self::retrieve_nodes) on a background task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn retrieve_nodes_with(
        &self,
        on_success: impl FnOnce(Vec<Node>) + Send + 'static,
        on_error: impl FnOnce(PocketError) + Send + 'static,
    ) -> JoinHandle<()> {
        let pocket = self.clone();
        spawn_notified(Notifier::new(on_success, on_error), async move {
            pocket.retrieve_nodes().await
        })
    }

    /// [`send_report`](Self::send_report) on a background task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn send_report_with(
        &self,
        report: Report,
        on_success: impl FnOnce(String) + Send + 'static,
        on_error: impl FnOnce(PocketError) + Send + 'static,
    ) -> JoinHandle<()> {
        let pocket = self.clone();
        spawn_notified(Notifier::new(on_success, on_error), async move {
            pocket.send_report(&report).await
        })
    }

    async fn resolve_node(&self, chain: &str, net_id: &str) -> Result<Node, PocketError> {
        let mut candidates = self.config.nodes().get(chain, net_id);
        if candidates.is_empty() {
            tracing::debug!(chain, net_id, "no cached node, dispatching");
            self.retrieve_nodes().await?;
            candidates = self.config.nodes().get(chain, net_id);
        }

        let node = self.selector.select(&candidates).cloned().ok_or_else(|| {
            PocketError::NodeNotFound {
                chain: chain.to_string(),
                net_id: net_id.to_string(),
            }
        })?;
        tracing::debug!(node = %node, candidates = candidates.len(), "node selected");
        Ok(node)
    }

    /// Best effort: the outcome never reaches the relay caller.
    async fn report_failure(&self, node: &Node, err: &TransportError) {
        let report = Report::new(node.ip(), err.to_string());
        if let Err(e) = self.report.submit(&report).await {
            tracing::warn!(ip = node.ip(), error = %e, "failed to report node");
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl std::fmt::Debug for Pocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pocket")
            .field("config", &self.config)
            .field("dispatch_url", &self.dispatch.url())
            .finish()
    }
}

fn spawn_notified<T, F>(notifier: Notifier<T>, operation: F) -> JoinHandle<()>
where
    T: Send + 'static,
    F: Future<Output = Result<T, PocketError>> + Send + 'static,
{
    tokio::spawn(async move {
        notifier.notify(operation.await);
    })
}
