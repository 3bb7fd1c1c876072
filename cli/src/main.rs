//! pocket CLI — fetch node pools and send relays from the terminal.
//!
//! Usage:
//! ```bash
//! # List the nodes the dispatcher hands out
//! pocket --dev-id DEV nodes --chain ETH --net-id 4
//!
//! # Send a JSON-RPC call through a random node
//! pocket --dev-id DEV relay --chain ETH --net-id 4 --method eth_blockNumber
//!
//! # Send a REST relay
//! pocket --dev-id DEV relay --chain TEZOS --net-id MAINNET --http-method GET --path /chains/main/blocks/head
//!
//! # Report a node by hand
//! pocket --dev-id DEV report --ip 1.2.3.4 --message "connection refused"
//!
//! # Print the version
//! pocket version
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use pocket_core::{
    Blockchain, HttpMethod, JsonRpcRequest, Pocket, PocketConfig, Relay, Report, RpcParam,
};

mod logging;

use logging::{init_tracing, LogConfig};

#[derive(Parser)]
#[command(
    name = "pocket",
    about = "Send blockchain RPC relays through the Pocket relay network",
    long_about = "
Send blockchain RPC relays through the Pocket relay network.

ENVIRONMENT VARIABLES:
  POCKET_DEV_ID               Developer id (instead of --dev-id)
  POCKET_DISPATCH_URL         Dispatcher base URL
  POCKET_MAX_NODES            Nodes kept per chain after dispatch
  POCKET_REQUEST_TIMEOUT_MS   Per-request timeout
  RUST_LOG                    Log filter (default: info)
",
    version
)]
struct Cli {
    /// Developer id sent with every dispatch and relay
    #[arg(long, env = "POCKET_DEV_ID", global = true)]
    dev_id: Option<String>,

    /// Dispatcher base URL (overrides POCKET_DISPATCH_URL)
    #[arg(long, global = true)]
    dispatch_url: Option<String>,

    /// Per-request timeout in milliseconds (overrides POCKET_REQUEST_TIMEOUT_MS)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Emit JSON logs on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print the node pool for one or more chains
    Nodes {
        /// Chain name, e.g. ETH (repeatable, paired with --net-id)
        #[arg(long, required = true)]
        chain: Vec<String>,
        /// Chain net id, e.g. 4 (repeatable)
        #[arg(long, required = true)]
        net_id: Vec<String>,
    },

    /// Send one relay and print the node's answer
    Relay {
        #[arg(long)]
        chain: String,
        #[arg(long)]
        net_id: String,
        /// Pre-serialized payload
        #[arg(long, conflicts_with_all = ["method", "http_method"])]
        data: Option<String>,
        /// JSON-RPC method to call
        #[arg(long, conflicts_with = "http_method")]
        method: Option<String>,
        /// JSON array of params for --method
        #[arg(long, default_value = "[]", requires = "method")]
        params: String,
        /// HTTP method of a REST relay
        #[arg(long, requires = "path")]
        http_method: Option<String>,
        /// Path of a REST relay
        #[arg(long, requires = "http_method")]
        path: Option<String>,
        /// Query parameter of a REST relay, as key=value (repeatable)
        #[arg(long = "query", value_parser = parse_key_value, requires = "http_method")]
        query: Vec<(String, String)>,
        /// Header of a REST relay, as name=value (repeatable)
        #[arg(long = "header", value_parser = parse_key_value, requires = "http_method")]
        headers: Vec<(String, String)>,
    },

    /// Report a misbehaving node to the dispatcher
    Report {
        #[arg(long)]
        ip: String,
        #[arg(long)]
        message: String,
    },

    /// Print version
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&LogConfig {
        level: if cli.verbose { "debug" } else { "info" }.into(),
        json: cli.json_logs,
    });

    if let Commands::Version = cli.command {
        println!("pocket {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config = PocketConfig::from_env()?;
    if let Some(url) = &cli.dispatch_url {
        config.dispatch_url = url.clone();
    }
    if let Some(ms) = cli.timeout_ms {
        config.request_timeout_ms = ms;
    }
    let dev_id = cli
        .dev_id
        .clone()
        .context("--dev-id or POCKET_DEV_ID is required")?;

    match cli.command {
        Commands::Nodes { chain, net_id } => cmd_nodes(dev_id, config, chain, net_id).await,
        Commands::Relay {
            chain,
            net_id,
            data,
            method,
            params,
            http_method,
            path,
            query,
            headers,
        } => {
            let pocket = pocket_http::connect(
                dev_id.clone(),
                vec![Blockchain::new(&chain, &net_id)],
                config,
            )?;
            let relay = match (data, method, http_method, path) {
                (Some(data), _, _, _) => Relay::new(chain, net_id, data, dev_id),
                (None, Some(method), _, _) => {
                    let params: Vec<RpcParam> =
                        serde_json::from_str(&params).context("--params must be a JSON array")?;
                    let request = JsonRpcRequest::new(1, method, params);
                    Relay::json_rpc(chain, net_id, dev_id, &request)?
                }
                (None, None, Some(http_method), Some(path)) => {
                    let http_method: HttpMethod =
                        http_method.parse().map_err(anyhow::Error::msg)?;
                    let mut relay = Relay::rest(chain, net_id, dev_id, http_method, path);
                    relay.query_params.extend(query);
                    relay.headers.extend(headers);
                    relay
                }
                _ => bail!("one of --data, --method or --http-method/--path is required"),
            };
            cmd_relay(&pocket, &relay).await
        }
        Commands::Report { ip, message } => {
            let pocket = pocket_http::connect(dev_id, Vec::new(), config)?;
            let ack = pocket.send_report(&Report::new(ip, message)).await?;
            println!("{ack}");
            Ok(())
        }
        Commands::Version => Ok(()),
    }
}

async fn cmd_nodes(
    dev_id: String,
    config: PocketConfig,
    chains: Vec<String>,
    net_ids: Vec<String>,
) -> Result<()> {
    if chains.len() != net_ids.len() {
        bail!("--chain and --net-id must be given the same number of times");
    }
    let chains = chains
        .into_iter()
        .zip(net_ids)
        .map(|(name, net_id)| Blockchain::new(name, net_id))
        .collect();

    let pocket = pocket_http::connect(dev_id, chains, config)?;
    let nodes = pocket.retrieve_nodes().await?;
    println!("{}", serde_json::to_string_pretty(&nodes)?);
    Ok(())
}

async fn cmd_relay(pocket: &Pocket, relay: &Relay) -> Result<()> {
    let started = std::time::Instant::now();
    let out = pocket.send(relay).await?;
    tracing::info!(
        chain = %relay.chain,
        net_id = %relay.net_id,
        latency_ms = started.elapsed().as_millis() as u64,
        "relay completed"
    );
    println!("{out}");
    Ok(())
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(
            ["pocket", "--dev-id", "D1"]
                .iter()
                .chain(args)
                .copied(),
        )
    }

    #[test]
    fn relay_with_data() {
        let cli = parse(&["relay", "--chain", "ETH", "--net-id", "4", "--data", "{}"]).unwrap();
        match cli.command {
            Commands::Relay { data, method, http_method, .. } => {
                assert_eq!(data.as_deref(), Some("{}"));
                assert!(method.is_none());
                assert!(http_method.is_none());
            }
            _ => panic!("expected relay"),
        }
    }

    #[test]
    fn relay_with_method_defaults_params() {
        let cli = parse(&["relay", "--chain", "ETH", "--net-id", "4", "--method", "eth_blockNumber"])
            .unwrap();
        match cli.command {
            Commands::Relay { method, params, .. } => {
                assert_eq!(method.as_deref(), Some("eth_blockNumber"));
                assert_eq!(params, "[]");
            }
            _ => panic!("expected relay"),
        }
    }

    #[test]
    fn rest_relay_collects_query_and_headers() {
        let cli = parse(&[
            "relay", "--chain", "TEZOS", "--net-id", "MAINNET",
            "--http-method", "GET", "--path", "/chains/main/blocks/head",
            "--query", "limit=1", "--header", "Accept=application/json",
        ])
        .unwrap();
        match cli.command {
            Commands::Relay { http_method, path, query, headers, .. } => {
                assert_eq!(http_method.as_deref(), Some("GET"));
                assert_eq!(path.as_deref(), Some("/chains/main/blocks/head"));
                assert_eq!(query, vec![("limit".to_string(), "1".to_string())]);
                assert_eq!(
                    headers,
                    vec![("Accept".to_string(), "application/json".to_string())]
                );
            }
            _ => panic!("expected relay"),
        }
    }

    #[test]
    fn conflicting_relay_payloads_are_rejected() {
        let base = ["relay", "--chain", "ETH", "--net-id", "4"];
        let with = |extra: &[&str]| parse(&[&base[..], extra].concat());

        assert!(with(&["--data", "{}", "--method", "eth_blockNumber"]).is_err());
        assert!(with(&["--data", "{}", "--http-method", "GET", "--path", "/"]).is_err());
        assert!(with(&["--method", "eth_blockNumber", "--http-method", "GET", "--path", "/"]).is_err());
        assert!(with(&["--http-method", "GET"]).is_err());
        assert!(with(&["--path", "/status"]).is_err());
        assert!(with(&["--params", "[1]"]).is_err());
    }

    #[test]
    fn query_and_header_need_a_rest_relay() {
        let base = ["relay", "--chain", "ETH", "--net-id", "4"];
        let with = |extra: &[&str]| parse(&[&base[..], extra].concat());

        assert!(with(&["--data", "{}", "--query", "a=b"]).is_err());
        assert!(with(&["--method", "eth_blockNumber", "--header", "a=b"]).is_err());
    }

    #[test]
    fn malformed_key_value_is_rejected() {
        assert_eq!(
            parse_key_value("limit=1").unwrap(),
            ("limit".to_string(), "1".to_string())
        );
        assert!(parse_key_value("limit").is_err());
    }

    #[test]
    fn version_subcommand_parses() {
        let cli = Cli::try_parse_from(["pocket", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }
}
