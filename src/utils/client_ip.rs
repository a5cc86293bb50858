//! Client IP resolution from the peer address and proxy headers.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Placeholder logged when the client address is unknown.
pub const UNKNOWN_IP: &str = "-";

/// Resolves the client IP address for a request.
///
/// When `behind_proxy` is set, the first entry of `X-Forwarded-For` wins,
/// then `X-Real-IP`. Header values that do not parse as an IP address are
/// ignored. Otherwise the socket peer address is used, and [`UNKNOWN_IP`]
/// when even that is missing (e.g. in-process test transports).
///
/// Enable `behind_proxy` only when a trusted reverse proxy sets these
/// headers; clients can forge them otherwise.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, behind_proxy: bool) -> String {
    if behind_proxy && let Some(ip) = forwarded_ip(headers) {
        return ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok());

    forwarded_for.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    })
}
