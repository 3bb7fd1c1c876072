//! A single relay node handed out by the dispatcher.

use serde::Serialize;

use crate::error::PocketError;

/// Path appended to a node's endpoint for relays.
pub const RELAY_PATH: &str = "/v1/relay/";

/// One network endpoint serving a `(chain, net id)` pair.
///
/// Built once from the dispatcher's `ip:port` string and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Node {
    chain: String,
    net_id: String,
    ip: String,
    port: u16,
    endpoint_url: String,
}

impl Node {
    /// Parse a node address for the given chain.
    ///
    /// Accepts `ip:port` (the scheme is derived from the port) or a full
    /// `http://` / `https://` URL.
    pub fn new(
        chain: impl Into<String>,
        net_id: impl Into<String>,
        address: &str,
    ) -> Result<Self, PocketError> {
        let address = address.trim();
        let (ip, port, endpoint_url) = match address.split_once("://") {
            Some((scheme, rest)) => {
                let default_port = match scheme {
                    "https" => 443,
                    "http" => 80,
                    other => {
                        return Err(PocketError::NodePoolParse(format!(
                            "unsupported scheme '{other}' in '{address}'"
                        )))
                    }
                };
                let authority = rest.split('/').next().unwrap_or_default();
                let (host, port) = match authority.rsplit_once(':') {
                    Some((host, port)) => (host, parse_port(port, address)?),
                    None => (authority, default_port),
                };
                (host.to_string(), port, address.trim_end_matches('/').to_string())
            }
            None => {
                let (host, port) = address.rsplit_once(':').ok_or_else(|| {
                    PocketError::NodePoolParse(format!("missing port in '{address}'"))
                })?;
                let port = parse_port(port, address)?;
                let scheme = if port == 443 { "https" } else { "http" };
                (host.to_string(), port, format!("{scheme}://{host}:{port}"))
            }
        };

        if ip.is_empty() {
            return Err(PocketError::NodePoolParse(format!(
                "missing host in '{address}'"
            )));
        }

        Ok(Self {
            chain: chain.into(),
            net_id: net_id.into(),
            ip,
            port,
            endpoint_url,
        })
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn net_id(&self) -> &str {
        &self.net_id
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Full URL relays for this node are posted to.
    pub fn relay_url(&self) -> String {
        format!("{}{RELAY_PATH}", self.endpoint_url)
    }

    /// Returns `true` if this node serves the given chain.
    pub fn serves(&self, chain: &str, net_id: &str) -> bool {
        self.chain == chain && self.net_id == net_id
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}@{}", self.chain, self.net_id, self.endpoint_url)
    }
}

fn parse_port(raw: &str, address: &str) -> Result<u16, PocketError> {
    raw.parse::<u16>()
        .map_err(|_| PocketError::NodePoolParse(format!("invalid port in '{address}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_address_gets_http() {
        let node = Node::new("ETH", "4", "1.2.3.4:8080").unwrap();
        assert_eq!(node.ip(), "1.2.3.4");
        assert_eq!(node.port(), 8080);
        assert_eq!(node.endpoint_url(), "http://1.2.3.4:8080");
        assert_eq!(node.relay_url(), "http://1.2.3.4:8080/v1/relay/");
    }

    #[test]
    fn port_443_gets_https() {
        let node = Node::new("ETH", "1", "node.example.com:443").unwrap();
        assert_eq!(node.endpoint_url(), "https://node.example.com:443");
    }

    #[test]
    fn schemed_address_is_kept() {
        let node = Node::new("AION", "256", "https://aion.example.com/").unwrap();
        assert_eq!(node.ip(), "aion.example.com");
        assert_eq!(node.port(), 443);
        assert_eq!(node.endpoint_url(), "https://aion.example.com");

        let node = Node::new("ETH", "4", "http://10.0.0.1:8545").unwrap();
        assert_eq!(node.port(), 8545);
        assert_eq!(node.endpoint_url(), "http://10.0.0.1:8545");
    }

    #[test]
    fn bad_addresses_are_rejected() {
        for raw in ["1.2.3.4", "1.2.3.4:notaport", ":8080", "ftp://x:21", "1.2.3.4:70000"] {
            let err = Node::new("ETH", "4", raw).unwrap_err();
            assert!(matches!(err, PocketError::NodePoolParse(_)), "{raw}: {err:?}");
        }
    }

    #[test]
    fn serves_matches_chain_and_net_id() {
        let node = Node::new("ETH", "4", "1.2.3.4:8080").unwrap();
        assert!(node.serves("ETH", "4"));
        assert!(!node.serves("ETH", "1"));
        assert!(!node.serves("AION", "4"));
    }
}
