//! Session configuration: developer id, registered chains, tuning knobs.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::NodeCache;
use crate::error::PocketError;

/// Default dispatcher base URL.
pub const DEFAULT_DISPATCH_URL: &str = "https://dispatch.pokt.network";

/// A `(chain, net id)` pair the session relays to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Blockchain {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "NetID")]
    pub net_id: String,
}

impl Blockchain {
    pub fn new(name: impl Into<String>, net_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            net_id: net_id.into(),
        }
    }
}

/// Tunables for a [`Pocket`](crate::pocket::Pocket) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PocketConfig {
    /// Base URL of the dispatch/report service.
    #[serde(default = "default_dispatch_url")]
    pub dispatch_url: String,
    /// Maximum nodes kept per chain after a dispatch (0 = unlimited).
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    /// Bound on every single HTTP exchange, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_dispatch_url() -> String {
    DEFAULT_DISPATCH_URL.to_string()
}

fn default_max_nodes() -> usize {
    50
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for PocketConfig {
    fn default() -> Self {
        Self {
            dispatch_url: default_dispatch_url(),
            max_nodes: default_max_nodes(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl PocketConfig {
    /// Defaults overlaid with `POCKET_DISPATCH_URL`, `POCKET_MAX_NODES`
    /// and `POCKET_REQUEST_TIMEOUT_MS` when set.
    pub fn from_env() -> Result<Self, PocketError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PocketError> {
        let mut config = Self::default();
        if let Some(url) = lookup("POCKET_DISPATCH_URL") {
            config.dispatch_url = url;
        }
        if let Some(raw) = lookup("POCKET_MAX_NODES") {
            config.max_nodes = raw.parse().map_err(|_| {
                PocketError::Config(format!("POCKET_MAX_NODES is not a number: '{raw}'"))
            })?;
        }
        if let Some(raw) = lookup("POCKET_REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = raw.parse().map_err(|_| {
                PocketError::Config(format!(
                    "POCKET_REQUEST_TIMEOUT_MS is not a number: '{raw}'"
                ))
            })?;
        }
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Mutable session state shared by every operation of one `Pocket`.
#[derive(Debug)]
pub struct Configuration {
    dev_id: String,
    chains: RwLock<Vec<Blockchain>>,
    nodes: NodeCache,
    max_nodes: usize,
    request_timeout: Duration,
}

impl Configuration {
    pub fn new(dev_id: impl Into<String>, chains: Vec<Blockchain>, config: &PocketConfig) -> Self {
        let mut unique: Vec<Blockchain> = Vec::with_capacity(chains.len());
        for chain in chains {
            if !unique.contains(&chain) {
                unique.push(chain);
            }
        }
        Self {
            dev_id: dev_id.into(),
            chains: RwLock::new(unique),
            nodes: NodeCache::new(),
            max_nodes: config.max_nodes,
            request_timeout: config.request_timeout(),
        }
    }

    pub fn dev_id(&self) -> &str {
        &self.dev_id
    }

    /// Registered chains, in registration order.
    pub fn chains(&self) -> Vec<Blockchain> {
        self.chains
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Register a chain. Returns `false` if it was already registered.
    pub fn add_blockchain(&self, chain: Blockchain) -> bool {
        let mut chains = self.chains.write().unwrap_or_else(PoisonError::into_inner);
        if chains.contains(&chain) {
            return false;
        }
        chains.push(chain);
        true
    }

    pub fn nodes(&self) -> &NodeCache {
        &self.nodes
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}
