//! Peer discovery over the node's `net_info` RPC endpoint
//!
//! Two payload shapes exist in the wild: a flat `peers` array whose entries
//! carry an `mconn://<node_id>@<host>:<port>` connection url, and a nested
//! `result.peers` array where the dialable host has to be reconstructed
//! from `listen_addr` and `remote_ip`. Both normalize into the same
//! `host:port` form before anything is dialed; entries that cannot be
//! normalized are excluded here and never probed.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SchemaMode;
use crate::errors::FetchError;

/// Host value some backends report when they never learned the remote
/// address of a peer. A real `remote_ip` always wins over it.
const PLACEHOLDER_HOST: &str = "0.0.0.0";

/// A candidate node discovered from `net_info`.
#[derive(Debug, Clone)]
pub struct Peer {
    pub node_id: Option<String>,
    /// Normalized `host:port`, used for dialing and for the final output.
    pub address: String,
    /// Original discovery payload, kept for diagnostics.
    pub raw: RawPeer,
    /// Position in the discovery response; the tie-break for equal
    /// latencies during selection.
    pub index: usize,
}

/// The discovery payload variant a peer came from.
#[derive(Debug, Clone)]
pub enum RawPeer {
    Flat { url: String },
    Nested { listen_addr: String, remote_ip: String },
}

impl RawPeer {
    /// Human description of where the address came from, for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            RawPeer::Flat { url } => format!("url {}", url),
            RawPeer::Nested {
                listen_addr,
                remote_ip,
            } => format!("listen_addr {} remote_ip {}", listen_addr, remote_ip),
        }
    }
}

// ---------- wire models ----------

#[derive(Debug, Deserialize)]
struct FlatNetInfo {
    peers: Vec<FlatPeerEntry>,
}

#[derive(Debug, Deserialize)]
struct FlatPeerEntry {
    #[serde(default)]
    node_id: Option<String>,
    url: String,
}

#[derive(Debug, Deserialize)]
struct NestedNetInfo {
    result: NestedResult,
}

#[derive(Debug, Deserialize)]
struct NestedResult {
    peers: Vec<NestedPeerEntry>,
}

#[derive(Debug, Deserialize)]
struct NestedPeerEntry {
    node_info: NodeInfo,
    #[serde(default)]
    remote_ip: String,
}

#[derive(Debug, Deserialize)]
struct NodeInfo {
    #[serde(default)]
    id: Option<String>,
    listen_addr: String,
    #[serde(default)]
    other: NodeInfoOther,
}

#[derive(Debug, Default, Deserialize)]
struct NodeInfoOther {
    #[serde(default)]
    rpc_address: Option<String>,
}

// ---------- address normalization ----------

/// Strip a scheme prefix (`mconn://`, `tcp://`, ...) if present.
fn strip_scheme(s: &str) -> &str {
    match s.find("://") {
        Some(idx) => &s[idx + 3..],
        None => s,
    }
}

/// Accept `addr` only if it splits into a non-empty host and a valid port.
fn checked_host_port(addr: &str) -> Option<String> {
    let (host, port) = addr.rsplit_once(':')?;
    port.parse::<u16>().ok()?;
    if host.is_empty() {
        return None;
    }
    Some(addr.to_string())
}

/// Extract `host:port` from a flat-schema connection url. Idempotent: an
/// already-normalized `host:port` passes through unchanged.
pub fn address_from_url(url: &str) -> Option<String> {
    let stripped = strip_scheme(url.trim());
    let addr = match stripped.rsplit_once('@') {
        Some((_, addr)) => addr,
        None => stripped,
    };
    checked_host_port(addr)
}

/// Build `host:port` from a nested-schema `listen_addr` and `remote_ip`.
/// The port always comes from the listen address; the host is replaced by
/// `remote_ip` unless that is the `0.0.0.0` placeholder.
pub fn address_from_listen(listen_addr: &str, remote_ip: &str) -> Option<String> {
    let stripped = strip_scheme(listen_addr.trim());
    let (listen_host, port) = stripped.rsplit_once(':')?;
    port.parse::<u16>().ok()?;

    let remote_ip = remote_ip.trim();
    let host = if !remote_ip.is_empty() && remote_ip != PLACEHOLDER_HOST {
        remote_ip
    } else {
        listen_host
    };
    if host.is_empty() {
        return None;
    }
    Some(format!("{}:{}", host, port))
}

// ---------- parsing ----------

fn parse_flat(body: &str) -> Result<Vec<Peer>, serde_json::Error> {
    let info: FlatNetInfo = serde_json::from_str(body)?;
    let mut peers = Vec::with_capacity(info.peers.len());
    for entry in info.peers {
        match address_from_url(&entry.url) {
            Some(address) => {
                peers.push(Peer {
                    node_id: entry.node_id,
                    address,
                    raw: RawPeer::Flat { url: entry.url },
                    index: peers.len(),
                });
            }
            None => {
                warn!(
                    target: "peerscout::netinfo",
                    "[NET_INFO] Excluding peer with malformed url: {}",
                    entry.url
                );
            }
        }
    }
    Ok(peers)
}

fn parse_nested(body: &str) -> Result<Vec<Peer>, serde_json::Error> {
    let info: NestedNetInfo = serde_json::from_str(body)?;
    let mut peers = Vec::with_capacity(info.result.peers.len());
    for entry in info.result.peers {
        match address_from_listen(&entry.node_info.listen_addr, &entry.remote_ip) {
            Some(address) => {
                debug!(
                    target: "peerscout::netinfo",
                    "[NET_INFO] Peer {} -> {} (rpc_address: {})",
                    entry.node_info.listen_addr,
                    address,
                    entry.node_info.other.rpc_address.as_deref().unwrap_or("unknown")
                );
                peers.push(Peer {
                    node_id: entry.node_info.id,
                    address,
                    raw: RawPeer::Nested {
                        listen_addr: entry.node_info.listen_addr,
                        remote_ip: entry.remote_ip,
                    },
                    index: peers.len(),
                });
            }
            None => {
                warn!(
                    target: "peerscout::netinfo",
                    "[NET_INFO] Excluding peer with malformed listen_addr: {}",
                    entry.node_info.listen_addr
                );
            }
        }
    }
    Ok(peers)
}

/// Decode a `net_info` body into peers under the requested schema mode.
pub fn parse_peers(body: &str, schema: SchemaMode) -> Result<Vec<Peer>, FetchError> {
    match schema {
        SchemaMode::Nested => {
            parse_nested(body).map_err(|e| FetchError::Parse(format!("nested shape: {}", e)))
        }
        SchemaMode::Flat => {
            parse_flat(body).map_err(|e| FetchError::Parse(format!("flat shape: {}", e)))
        }
        SchemaMode::Auto => parse_nested(body).or_else(|nested| {
            parse_flat(body).map_err(|flat| {
                FetchError::Parse(format!(
                    "matched neither nested ({}) nor flat ({}) shape",
                    nested, flat
                ))
            })
        }),
    }
}

// ---------- fetch ----------

/// GET `<base_url>/net_info` bounded by `timeout` and decode the peer list.
/// A deadline expiry surfaces as `FetchError::Timeout`, distinct from other
/// transport errors.
pub async fn fetch_peers(
    base_url: &str,
    schema: SchemaMode,
    timeout: Duration,
) -> Result<Vec<Peer>, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(FetchError::Network)?;

    let url = format!("{}/net_info", base_url.trim_end_matches('/'));
    debug!(target: "peerscout::netinfo", "[NET_INFO] GET {}", url);

    let response = client.get(&url).send().await.map_err(classify)?;
    let body = response.text().await.map_err(classify)?;

    parse_peers(&body, schema)
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_url_extraction() {
        assert_eq!(
            address_from_url("mconn://abcd1234@203.0.113.7:26656").as_deref(),
            Some("203.0.113.7:26656")
        );
    }

    #[test]
    fn test_normalization_idempotent() {
        let normalized = address_from_url("mconn://abcd1234@203.0.113.7:26656").unwrap();
        assert_eq!(address_from_url(&normalized).as_deref(), Some(normalized.as_str()));
        assert_eq!(
            address_from_listen("35.189.236.126:26656", "0.0.0.0").as_deref(),
            Some("35.189.236.126:26656")
        );
    }

    #[test]
    fn test_flat_malformed_urls_rejected() {
        assert_eq!(address_from_url("mconn://garbage"), None);
        assert_eq!(address_from_url("mconn://id@host-without-port"), None);
        assert_eq!(address_from_url("mconn://id@host:notaport"), None);
        assert_eq!(address_from_url(""), None);
    }

    #[test]
    fn test_nested_placeholder_keeps_listen_host() {
        assert_eq!(
            address_from_listen("tcp://35.189.236.126:26656", "0.0.0.0").as_deref(),
            Some("35.189.236.126:26656")
        );
    }

    #[test]
    fn test_nested_remote_ip_replaces_host() {
        assert_eq!(
            address_from_listen("tcp://35.189.236.126:26656", "10.0.0.5").as_deref(),
            Some("10.0.0.5:26656")
        );
    }

    #[test]
    fn test_nested_malformed_listen_addr_rejected() {
        assert_eq!(address_from_listen("tcp://no-port", "1.2.3.4"), None);
        assert_eq!(address_from_listen("", "1.2.3.4"), None);
    }

    #[test]
    fn test_parse_flat_schema() {
        let body = r#"{
            "n_peers": "2",
            "peers": [
                {"node_id": "aa", "url": "mconn://aa@198.51.100.1:26656"},
                {"node_id": "bb", "url": "mconn://broken"}
            ]
        }"#;
        let peers = parse_peers(body, SchemaMode::Flat).expect("flat parse");
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].address, "198.51.100.1:26656");
        assert_eq!(peers[0].node_id.as_deref(), Some("aa"));
        assert_eq!(peers[0].index, 0);
    }

    #[test]
    fn test_parse_nested_schema() {
        let body = r#"{
            "result": {
                "peers": [
                    {
                        "node_info": {
                            "id": "cc",
                            "listen_addr": "tcp://0.0.0.0:26656",
                            "other": {"rpc_address": "tcp://0.0.0.0:26657"}
                        },
                        "remote_ip": "198.51.100.9"
                    }
                ]
            }
        }"#;
        let peers = parse_peers(body, SchemaMode::Nested).expect("nested parse");
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].address, "198.51.100.9:26656");
        assert_eq!(peers[0].node_id.as_deref(), Some("cc"));
    }

    #[test]
    fn test_auto_decodes_both_shapes() {
        let nested = r#"{"result": {"peers": [{"node_info": {"id": "x", "listen_addr": "tcp://1.2.3.4:26656"}, "remote_ip": "0.0.0.0"}]}}"#;
        let flat = r#"{"peers": [{"node_id": "y", "url": "mconn://y@5.6.7.8:26656"}]}"#;

        let from_nested = parse_peers(nested, SchemaMode::Auto).expect("auto nested");
        assert_eq!(from_nested[0].address, "1.2.3.4:26656");

        let from_flat = parse_peers(flat, SchemaMode::Auto).expect("auto flat");
        assert_eq!(from_flat[0].address, "5.6.7.8:26656");
    }

    #[test]
    fn test_wrong_schema_is_parse_error() {
        let flat = r#"{"peers": [{"node_id": "y", "url": "mconn://y@5.6.7.8:26656"}]}"#;
        let err = parse_peers(flat, SchemaMode::Nested).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));

        let junk = r#"{"not": "net_info"}"#;
        let err = parse_peers(junk, SchemaMode::Auto).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }
}
