//! peerscout: rank a node's `net_info` peers by TCP connect latency and
//! emit a comma-joined persistent-peers list.
//!
//! Pipeline: fetch the peer list, dial every peer with a bounded timeout,
//! drop the unreachable and the slow, sort the rest fastest-first, truncate
//! to the requested count, print the joined addresses last on stdout.

mod config;
mod errors;
mod ipfilter;
mod netinfo;
mod probe;
mod report;
mod select;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // init tracing from env PEERSCOUT_LOG or RUST_LOG; events go to stderr
    // so stdout carries only the diagnostic lines and the joined list
    let filter = std::env::var("PEERSCOUT_LOG")
        .unwrap_or_else(|_| std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cfg = Config::parse();
    Url::parse(&cfg.rpc).with_context(|| format!("invalid rpc url: {}", cfg.rpc))?;

    println!("rpc: {}", cfg.rpc);
    info!(
        target: "peerscout",
        "[PEERSCOUT] Discovering peers via {}/net_info (schema: {:?})",
        cfg.rpc,
        cfg.schema
    );

    // Discovery failure is fatal: with no peer list there is nothing to rank.
    let peers = netinfo::fetch_peers(&cfg.rpc, cfg.schema, cfg.fetch_timeout())
        .await
        .context("failed to fetch peers info")?;

    info!(target: "peerscout", "[PEERSCOUT] Discovered {} peers", peers.len());

    let peers: Vec<_> = if cfg.skip_private {
        peers
            .into_iter()
            .filter(|peer| {
                if ipfilter::is_private_host(ipfilter::host_of(&peer.address)) {
                    report::report_private_skip(peer);
                    false
                } else {
                    true
                }
            })
            .collect()
    } else {
        peers
    };

    let outcomes = probe::probe_all(peers, cfg.dial_timeout(), cfg.concurrency).await;

    // A failed probe eliminates that one peer, never the run.
    let mut probed = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(latency) => {
                let entry = probe::ProbedPeer {
                    peer: outcome.peer,
                    latency,
                };
                report::report_probe_success(&entry);
                probed.push(entry);
            }
            Err(err) => report::report_probe_failure(&outcome.peer, &err),
        }
    }

    let selection = select::select_peers(probed, cfg.max_latency(), cfg.n);
    for rejected in &selection.rejected {
        report::report_too_slow(rejected, cfg.ms);
    }
    report::report_selection(&selection.selected);

    info!(
        target: "peerscout",
        "[PEERSCOUT] Selected {} of the discovered peers",
        selection.selected.len()
    );

    // The product: joined addresses, last line on stdout. An empty
    // selection is still a success as long as discovery worked.
    println!("{}", report::join_addresses(&selection.selected));

    Ok(())
}
