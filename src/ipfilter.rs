//! Pre-probe host filtering
//!
//! Guardrail behind `--skip-private`: peers advertising RFC 1918,
//! loopback, link-local, multicast, or otherwise non-routable IPv4 hosts
//! are dropped before any dial is attempted. Hostnames and IPv6 hosts pass
//! through and the dial decides. Off by default: the nested discovery
//! schema can legitimately yield private hosts via `remote_ip` when the
//! operator runs inside the same network.

use std::net::{IpAddr, Ipv4Addr};

/// True when `host` parses as a private or non-routable IPv4 address.
pub fn is_private_host(host: &str) -> bool {
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => is_private_ipv4(&v4),
        Ok(IpAddr::V6(_)) => false,
        Err(_) => false,
    }
}

/// RFC 1918 ranges plus loopback, link-local, multicast, broadcast and the
/// zero network.
pub fn is_private_ipv4(ip: &Ipv4Addr) -> bool {
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_multicast()
        || ip.is_broadcast()
        || ip.is_unspecified()
        || ip.octets()[0] == 0
}

/// The host part of a normalized `host:port` address.
pub fn host_of(address: &str) -> &str {
    match address.rsplit_once(':') {
        Some((host, _port)) => host,
        None => address,
    }
}
