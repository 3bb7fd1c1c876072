//! In-memory node pool.
//!
//! The pool is only ever swapped as a whole: a dispatch refresh builds a new
//! vector and replaces the old one under the write lock, so readers see
//! either the previous pool or the new one.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::node::Node;

/// Cached node pool, owned by [`Configuration`](crate::config::Configuration).
#[derive(Debug, Default)]
pub struct NodeCache {
    nodes: RwLock<Vec<Node>>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes serving `(chain, net_id)`, in pool order.
    pub fn get(&self, chain: &str, net_id: &str) -> Vec<Node> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.serves(chain, net_id))
            .cloned()
            .collect()
    }

    /// Replace the whole pool, keeping at most `max_per_chain` nodes for
    /// each `(chain, net_id)` pair (`0` keeps everything).
    pub fn replace(&self, nodes: Vec<Node>, max_per_chain: usize) -> Vec<Node> {
        let nodes = if max_per_chain == 0 {
            nodes
        } else {
            let mut seen: HashMap<(String, String), usize> = HashMap::new();
            nodes
                .into_iter()
                .filter(|n| {
                    let count = seen
                        .entry((n.chain().to_string(), n.net_id().to_string()))
                        .or_insert(0);
                    *count += 1;
                    *count <= max_per_chain
                })
                .collect()
        };

        *self.nodes.write().unwrap_or_else(PoisonError::into_inner) = nodes.clone();
        nodes
    }

    /// A copy of the full pool.
    pub fn snapshot(&self) -> Vec<Node> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(chain: &str, net_id: &str, addr: &str) -> Node {
        Node::new(chain, net_id, addr).unwrap()
    }

    #[test]
    fn empty_until_replaced() {
        let cache = NodeCache::new();
        assert!(cache.is_empty());
        assert!(cache.get("ETH", "4").is_empty());
    }

    #[test]
    fn replace_is_wholesale() {
        let cache = NodeCache::new();
        cache.replace(vec![node("ETH", "4", "1.1.1.1:80")], 0);
        cache.replace(vec![node("AION", "256", "2.2.2.2:80")], 0);
        assert!(cache.get("ETH", "4").is_empty());
        assert_eq!(cache.get("AION", "256").len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn replace_caps_per_chain() {
        let cache = NodeCache::new();
        let kept = cache.replace(
            vec![
                node("ETH", "4", "1.1.1.1:80"),
                node("ETH", "4", "1.1.1.2:80"),
                node("ETH", "4", "1.1.1.3:80"),
                node("ETH", "1", "3.3.3.3:80"),
            ],
            2,
        );
        assert_eq!(kept.len(), 3);
        assert_eq!(cache.get("ETH", "4").len(), 2);
        assert_eq!(cache.get("ETH", "1").len(), 1);
    }
}
