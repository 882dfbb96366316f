//! CLI configuration
//!
//! Flags win over `PEERSCOUT_*` environment overrides, which win over the
//! built-in defaults. Every timeout is explicit configuration threaded
//! through the pipeline; nothing hides behind a constant.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Public RPC endpoint queried when none is given.
const DEFAULT_RPC: &str = "https://sei-rpc.polkachu.com";

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn default_rpc() -> String {
    env::var("PEERSCOUT_RPC").unwrap_or_else(|_| DEFAULT_RPC.to_string())
}

/// Which `net_info` payload shape to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaMode {
    /// Try the nested `result.peers` shape first, then the flat `peers`
    /// shape. The nested shape is the stricter match, so the precedence is
    /// harmless.
    Auto,
    /// Flat top-level `peers` array carrying `mconn://` connection urls.
    Flat,
    /// Nested `result.peers` array carrying `listen_addr` + `remote_ip`.
    Nested,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "peerscout",
    version,
    about = "Rank a node's net_info peers by TCP connect latency"
)]
pub struct Config {
    /// RPC base url queried for /net_info
    #[arg(long, default_value_t = default_rpc())]
    pub rpc: String,

    /// Maximum number of peers to keep in the final list
    #[arg(long, default_value_t = env_or("PEERSCOUT_N", 30))]
    pub n: usize,

    /// Latency ceiling in milliseconds; slower peers are dropped
    #[arg(long, default_value_t = env_or("PEERSCOUT_MS", 1000))]
    pub ms: u64,

    /// Per-peer dial timeout in milliseconds
    #[arg(long = "dial-ms", default_value_t = env_or("PEERSCOUT_DIAL_MS", 3000))]
    pub dial_ms: u64,

    /// Overall discovery fetch timeout in milliseconds
    #[arg(long = "fetch-ms", default_value_t = env_or("PEERSCOUT_FETCH_MS", 3000))]
    pub fetch_ms: u64,

    /// Maximum simultaneous dial attempts
    #[arg(long, default_value_t = env_or("PEERSCOUT_CONCURRENCY", 16))]
    pub concurrency: usize,

    /// net_info payload shape to decode
    #[arg(long, value_enum, default_value = "auto")]
    pub schema: SchemaMode,

    /// Drop peers advertising private or non-routable IPv4 hosts before
    /// probing
    #[arg(long)]
    pub skip_private: bool,
}

impl Config {
    pub fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_ms)
    }

    pub fn max_latency(&self) -> Duration {
        Duration::from_millis(self.ms)
    }
}
