//! TCP connect latency probing
//!
//! A probe opens one TCP connection, measures the wall-clock time to
//! establishment, and drops the stream without exchanging any protocol
//! data. The fan-out bounds simultaneous dials with a semaphore so a large
//! peer list cannot exhaust file descriptors.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::debug;

use crate::errors::ProbeError;
use crate::netinfo::Peer;

/// Outcome of probing one peer. Failures keep the peer so diagnostics can
/// name its address.
#[derive(Debug)]
pub struct ProbeOutcome {
    pub peer: Peer,
    pub result: Result<Duration, ProbeError>,
}

/// A peer that answered within the dial timeout. Latency is set exactly
/// once, here.
#[derive(Debug, Clone)]
pub struct ProbedPeer {
    pub peer: Peer,
    pub latency: Duration,
}

/// Split `host:port` ahead of dialing. Addresses that do not split are
/// rejected without a dial attempt.
fn split_address(address: &str) -> Result<(&str, u16), ProbeError> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| ProbeError::MalformedAddress(address.to_string()))?;
    let port = port
        .parse::<u16>()
        .map_err(|_| ProbeError::MalformedAddress(address.to_string()))?;
    if host.is_empty() {
        return Err(ProbeError::MalformedAddress(address.to_string()));
    }
    Ok((host, port))
}

/// Dial `address` bounded by `dial_timeout` and report the elapsed time to
/// connection establishment.
pub async fn probe_peer(address: &str, dial_timeout: Duration) -> Result<Duration, ProbeError> {
    let (host, port) = split_address(address)?;
    let target = format!("{}:{}", host, port);

    let started = Instant::now();
    match timeout(dial_timeout, TcpStream::connect(&target)).await {
        Ok(Ok(stream)) => {
            let elapsed = started.elapsed();
            drop(stream);
            debug!(
                target: "peerscout::probe",
                "[PROBE] {} connected in {}ms",
                target,
                elapsed.as_millis()
            );
            Ok(elapsed)
        }
        Ok(Err(e)) => Err(ProbeError::Unreachable(e)),
        Err(_) => Err(ProbeError::Timeout {
            timeout_ms: dial_timeout.as_millis() as u64,
        }),
    }
}

/// Probe every peer with at most `concurrency` simultaneous dials.
/// Outcomes are collected independently and in input order; one peer's
/// failure never cancels or blocks another's probe.
pub async fn probe_all(
    peers: Vec<Peer>,
    dial_timeout: Duration,
    concurrency: usize,
) -> Vec<ProbeOutcome> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let tasks = peers.into_iter().map(|peer| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            // Never closed while probing, so acquire cannot fail.
            let _permit = semaphore.acquire().await.expect("probe semaphore closed");
            let result = probe_peer(&peer.address, dial_timeout).await;
            ProbeOutcome { peer, result }
        }
    });

    join_all(tasks).await
}
