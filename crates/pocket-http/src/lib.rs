//! pocket-http — `reqwest` transport for PocketRelay.
//!
//! # Quick start
//! ```rust,no_run
//! use pocket_core::{Blockchain, EthRpc, PocketConfig, Relay};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pocket = pocket_http::connect("DEV_ID", vec![Blockchain::new("ETH", "4")], PocketConfig::default())?;
//! let relay = Relay::json_rpc("ETH", "4", "DEV_ID", &EthRpc::block_number(1))?;
//! let block = pocket.send(&relay).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::{connect, HttpTransport};
