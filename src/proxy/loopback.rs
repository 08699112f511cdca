//! Loopback guard.
//!
//! The proxy marks every outbound fetch with a `via` header. If an inbound
//! request already carries that marker and the reported client address is a
//! loopback address, the target URL routes back through this process and
//! fetching it would recurse forever. This check runs before any network
//! I/O; the only safe answer is a redirect to the original URL.

use axum::http::{header, HeaderMap};

/// Hop provenance marker attached to every outbound fetch.
pub const PROXY_VIA: &str = "1.1 bandwidth-hero";

const LOOPBACK_ADDRS: &[&str] = &["127.0.0.1", "::1"];

/// Returns true when this request was already routed through this proxy.
///
/// The forwarded-for header takes precedence over the peer address, since a
/// self-call arrives through the local stack with the original client
/// address preserved in `x-forwarded-for`.
pub fn is_self_request(headers: &HeaderMap, peer_ip: &str) -> bool {
    let via_matches = headers
        .get(header::VIA)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == PROXY_VIA)
        .unwrap_or(false);
    if !via_matches {
        return false;
    }

    let reported_ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .unwrap_or(peer_ip);

    LOOPBACK_ADDRS.contains(&reported_ip)
}
