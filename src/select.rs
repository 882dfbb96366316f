//! Latency-based peer selection
//!
//! Pure ranking over already-probed peers: apply the latency ceiling, sort
//! ascending, truncate. Equal latencies break by discovery order so the
//! result is deterministic regardless of probe completion order.

use std::time::Duration;

use crate::probe::ProbedPeer;

/// Result of applying the ceiling and the ranking. Rejected peers are kept
/// only so the caller can emit a diagnostic line per drop.
#[derive(Debug)]
pub struct Selection {
    /// Fastest first, at most `limit` entries, all within the ceiling.
    pub selected: Vec<ProbedPeer>,
    /// Peers over the ceiling, in input order.
    pub rejected: Vec<ProbedPeer>,
}

/// Rank `probed` by ascending latency, dropping peers slower than
/// `max_latency` and truncating to `limit`. Fewer qualifying peers than
/// `limit` is not an error.
pub fn select_peers(
    probed: Vec<ProbedPeer>,
    max_latency: Duration,
    limit: usize,
) -> Selection {
    let (mut selected, rejected): (Vec<_>, Vec<_>) = probed
        .into_iter()
        .partition(|p| p.latency <= max_latency);

    selected.sort_by(|a, b| {
        a.latency
            .cmp(&b.latency)
            .then(a.peer.index.cmp(&b.peer.index))
    });
    selected.truncate(limit);

    Selection { selected, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netinfo::{Peer, RawPeer};

    fn probed(address: &str, index: usize, millis: u64) -> ProbedPeer {
        ProbedPeer {
            peer: Peer {
                node_id: None,
                address: address.to_string(),
                raw: RawPeer::Flat {
                    url: format!("mconn://test@{}", address),
                },
                index,
            },
            latency: Duration::from_millis(millis),
        }
    }

    #[test]
    fn test_ceiling_filters_and_orders() {
        let input = vec![
            probed("host1:26656", 0, 50),
            probed("host2:26656", 1, 2000),
            probed("host3:26656", 2, 300),
        ];
        let selection = select_peers(input, Duration::from_millis(1000), 30);

        let addresses: Vec<_> = selection
            .selected
            .iter()
            .map(|p| p.peer.address.as_str())
            .collect();
        assert_eq!(addresses, vec!["host1:26656", "host3:26656"]);
        assert_eq!(selection.rejected.len(), 1);
        assert_eq!(selection.rejected[0].peer.address, "host2:26656");
    }

    #[test]
    fn test_sorted_ascending_for_any_input_order() {
        let input = vec![
            probed("a:1", 0, 400),
            probed("b:1", 1, 100),
            probed("c:1", 2, 900),
            probed("d:1", 3, 10),
        ];
        let selection = select_peers(input, Duration::from_millis(1000), 30);
        let latencies: Vec<_> = selection.selected.iter().map(|p| p.latency).collect();
        for pair in latencies.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn test_limit_truncates() {
        let input = (0..10)
            .map(|i| probed(&format!("peer{}:1", i), i, 10 + i as u64))
            .collect();
        let selection = select_peers(input, Duration::from_millis(1000), 3);
        assert_eq!(selection.selected.len(), 3);
        assert_eq!(selection.selected[0].peer.address, "peer0:1");
    }

    #[test]
    fn test_equal_latency_breaks_by_discovery_order() {
        let input = vec![
            probed("late:1", 5, 100),
            probed("early:1", 1, 100),
        ];
        let selection = select_peers(input, Duration::from_millis(1000), 30);
        assert_eq!(selection.selected[0].peer.address, "early:1");
        assert_eq!(selection.selected[1].peer.address, "late:1");
    }

    #[test]
    fn test_latency_equal_to_ceiling_is_kept() {
        let input = vec![probed("edge:1", 0, 1000)];
        let selection = select_peers(input, Duration::from_millis(1000), 30);
        assert_eq!(selection.selected.len(), 1);
        assert!(selection.rejected.is_empty());
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        let selection = select_peers(Vec::new(), Duration::from_millis(1000), 30);
        assert!(selection.selected.is_empty());
        assert!(selection.rejected.is_empty());
    }
}
