//! Output formatting and per-peer diagnostics
//!
//! The joined address list is the program's product and goes to stdout
//! last; every diagnostic line precedes it. Structured events mirror the
//! diagnostics on stderr via tracing so piped output stays clean.
//! Diagnostic printing never fails the pipeline.

use tracing::{info, warn};

use crate::errors::ProbeError;
use crate::netinfo::Peer;
use crate::probe::ProbedPeer;

/// Addresses joined by a single comma, no trailing separator, no
/// surrounding whitespace.
pub fn join_addresses(selection: &[ProbedPeer]) -> String {
    selection
        .iter()
        .map(|p| p.peer.address.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// One line per successfully probed peer.
pub fn report_probe_success(probed: &ProbedPeer) {
    println!(
        "url: {}, speed: {}(ms)",
        probed.peer.address,
        probed.latency.as_millis()
    );
}

/// One line per peer that failed its probe.
pub fn report_probe_failure(peer: &Peer, err: &ProbeError) {
    println!("failed to check speed - {}", peer.address);
    warn!(
        target: "peerscout::report",
        "[REPORT] Probe failed for {} ({}): {}",
        peer.address,
        peer.raw.describe(),
        err
    );
}

/// One line per peer rejected by the latency ceiling.
pub fn report_too_slow(probed: &ProbedPeer, max_ms: u64) {
    println!("too late peers - {}", probed.peer.address);
    info!(
        target: "peerscout::report",
        "[REPORT] Rejected {} ({}ms > {}ms ceiling)",
        probed.peer.address,
        probed.latency.as_millis(),
        max_ms
    );
}

/// One line per peer dropped by the private-host filter.
pub fn report_private_skip(peer: &Peer) {
    println!("skipping private peer - {}", peer.address);
    info!(
        target: "peerscout::report",
        "[REPORT] Skipped private host {}",
        peer.address
    );
}

/// Ranked listing of the final selection, then the total count.
pub fn report_selection(selection: &[ProbedPeer]) {
    for (idx, probed) in selection.iter().enumerate() {
        println!(
            "# {} {} speed: {}ms",
            idx + 1,
            probed.peer.address,
            probed.latency.as_millis()
        );
        info!(
            target: "peerscout::report",
            "[REPORT] #{} {} ({}ms, node_id: {})",
            idx + 1,
            probed.peer.address,
            probed.latency.as_millis(),
            probed.peer.node_id.as_deref().unwrap_or("unknown")
        );
    }
    println!("total peers: {}", selection.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netinfo::RawPeer;
    use std::time::Duration;

    fn probed(address: &str, index: usize) -> ProbedPeer {
        ProbedPeer {
            peer: Peer {
                node_id: None,
                address: address.to_string(),
                raw: RawPeer::Flat {
                    url: format!("mconn://test@{}", address),
                },
                index,
            },
            latency: Duration::from_millis(50),
        }
    }

    #[test]
    fn test_join_is_comma_separated_without_trailer() {
        let selection = vec![probed("host1:26656", 0), probed("host2:26656", 1)];
        assert_eq!(join_addresses(&selection), "host1:26656,host2:26656");
    }

    #[test]
    fn test_join_single_peer_has_no_separator() {
        let selection = vec![probed("host1:26656", 0)];
        assert_eq!(join_addresses(&selection), "host1:26656");
    }

    #[test]
    fn test_join_empty_selection_is_empty_string() {
        assert_eq!(join_addresses(&[]), "");
    }
}
