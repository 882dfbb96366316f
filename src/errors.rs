//! Domain-specific error types for peerscout
//!
//! Structured error handling instead of a String/anyhow mix. Discovery
//! failures are fatal; probe failures are scoped to a single peer.

use thiserror::Error;

/// Peer discovery errors. Fatal: with no peer list there is nothing to rank.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request deadline expired during the discovery fetch. Kept
    /// distinct from other transport errors so the caller can log it as a
    /// deadline problem rather than a connectivity one.
    #[error("net_info request timed out")]
    Timeout,

    #[error("net_info request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("net_info response matched no known schema: {0}")]
    Parse(String),
}

/// Per-peer probe errors. Local: the offending peer is dropped and the
/// pipeline continues with the rest.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Address could not be split into host and port; no dial is attempted.
    #[error("malformed peer address: {0}")]
    MalformedAddress(String),

    #[error("dial timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("peer unreachable: {0}")]
    Unreachable(#[source] std::io::Error),
}
