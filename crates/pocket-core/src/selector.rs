//! Node selection strategies.

use rand::seq::SliceRandom;

use crate::node::Node;

/// Picks the node a relay is sent to from the chain-matching candidates.
pub trait NodeSelector: Send + Sync + 'static {
    fn select<'a>(&self, candidates: &'a [Node]) -> Option<&'a Node>;
}

/// Uniform random choice, no affinity or weighting.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl NodeSelector for RandomSelector {
    fn select<'a>(&self, candidates: &'a [Node]) -> Option<&'a Node> {
        candidates.choose(&mut rand::thread_rng())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn empty_pool_selects_nothing() {
        assert!(RandomSelector.select(&[]).is_none());
    }

    #[test]
    fn single_node_is_always_selected() {
        let pool = vec![Node::new("ETH", "4", "1.2.3.4:8080").unwrap()];
        for _ in 0..20 {
            assert_eq!(RandomSelector.select(&pool), Some(&pool[0]));
        }
    }

    #[test]
    fn selection_covers_the_pool() {
        let pool: Vec<Node> = (1..=3)
            .map(|i| Node::new("ETH", "4", &format!("10.0.0.{i}:80")).unwrap())
            .collect();
        let seen: HashSet<&str> = (0..500)
            .filter_map(|_| RandomSelector.select(&pool))
            .map(|n| n.ip())
            .collect();
        assert_eq!(seen.len(), 3);
    }
}
