//! Client IP handling
//!
//! Unified client IP extraction supporting:
//! - trusted proxy configuration (trusted_proxies)
//! - CIDR matching
//! - automatic private-IP proxy detection
//!
//! Raw addresses never leave this module for storage purposes: callers
//! persist only the one-way [`visitor_key`] derived here.

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::dev::ConnectionInfo;
use base64::Engine;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::get_config;

/// Number of base64 characters kept from the visitor hash
const VISITOR_KEY_LEN: usize = 16;

/// One-way visitor key for an IP address.
///
/// SHA-256 over the address plus a static salt, base64-encoded and
/// truncated. Empty input yields an empty key.
pub fn visitor_key(ip: &str, salt: &str) -> String {
    if ip.is_empty() {
        return String::new();
    }

    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hasher.update(salt.as_bytes());
    let digest = hasher.finalize();

    let encoded = base64::engine::general_purpose::STANDARD.encode(digest);
    encoded[..VISITOR_KEY_LEN].to_string()
}

/// Check whether an IP is a private or loopback address
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            // IPv6 private ranges:
            // - fc00::/7 (ULA, RFC 4193)
            // - fe80::/10 (link-local)
            // - ::1 (loopback)
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// Check whether an IP is in the trusted proxy list
pub fn is_trusted_proxy(ip: &str, trusted_proxies: &[String]) -> bool {
    // Try SocketAddr first (ip:port), then bare IpAddr
    let ip_addr = if let Ok(socket_addr) = ip.parse::<SocketAddr>() {
        socket_addr.ip()
    } else if let Ok(ip_addr) = ip.parse::<IpAddr>() {
        ip_addr
    } else {
        return false;
    };

    for proxy in trusted_proxies {
        if proxy.contains('/') {
            // CIDR form ("192.168.1.0/24")
            if ip_in_cidr(&ip_addr, proxy) {
                return true;
            }
        } else {
            // single IP
            if let Ok(proxy_addr) = proxy.parse::<IpAddr>()
                && ip_addr == proxy_addr
            {
                return true;
            }
        }
    }
    false
}

/// CIDR membership check
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };

    let Ok(prefix_len): Result<u8, _> = prefix_len.parse() else {
        return false;
    };

    let Ok(network_addr) = network.parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            if prefix_len > 32 {
                return false;
            }
            let mask = u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u32::from_be_bytes(ip.octets());
            let net_bits = u32::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            if prefix_len > 128 {
                return false;
            }
            let mask = u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u128::from_be_bytes(ip.octets());
            let net_bits = u128::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        _ => false, // IPv4 vs IPv6 mismatch
    }
}

/// Extract the real client IP from ConnectionInfo.
///
/// Priority:
/// 1. explicit trusted_proxies match -> use X-Forwarded-For
/// 2. no trusted_proxies configured and the peer is a private IP ->
///    assume a reverse proxy, use X-Forwarded-For when present
/// 3. default -> peer IP (direct public connection, spoof-safe)
///
/// The `get_forwarded_ip` closure reads the forwarded address from the
/// request headers (X-Forwarded-For or X-Real-IP).
pub fn extract_client_ip_from_conn_info<F>(
    conn_info: &ConnectionInfo,
    get_forwarded_ip: F,
) -> Option<String>
where
    F: FnOnce() -> Option<String>,
{
    let peer_ip = conn_info.peer_addr()?;

    let trusted_proxies = &get_config().server.trusted_proxies;
    if !trusted_proxies.is_empty() {
        if is_trusted_proxy(peer_ip, trusted_proxies) {
            let real_ip = get_forwarded_ip().unwrap_or_else(|| peer_ip.to_string());
            debug!("Trusted proxy (explicit): {} -> {}", peer_ip, real_ip);
            return Some(real_ip);
        }
        // configured but unmatched: do not trust X-Forwarded-For
        debug!(
            "Connection from {}, not in trusted_proxies, using peer IP",
            peer_ip
        );
        return Some(peer_ip.to_string());
    }

    if let Ok(ip_addr) = peer_ip.parse::<IpAddr>()
        && is_private_or_local(&ip_addr)
    {
        // private peer: assume a reverse proxy sits in front
        if let Some(real_ip) = get_forwarded_ip() {
            debug!(
                "Auto-detect proxy (private IP {}): using X-Forwarded-For: {}",
                peer_ip, real_ip
            );
            return Some(real_ip);
        }
        debug!("Private IP {} without X-Forwarded-For", peer_ip);
    }

    Some(peer_ip.to_string())
}

/// Extract the real client IP from an HttpRequest
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    extract_client_ip_from_conn_info(&req.connection_info(), || extract_forwarded_ip(req))
}

fn extract_forwarded_ip(req: &HttpRequest) -> Option<String> {
    extract_forwarded_ip_from_headers(req.headers())
}

/// Extract the forwarded IP from a HeaderMap
pub fn extract_forwarded_ip_from_headers(
    headers: &actix_web::http::header::HeaderMap,
) -> Option<String> {
    // X-Forwarded-For first (first entry is the original client)
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visitor_key_stable_and_salted() {
        let a = visitor_key("203.0.113.9", "salt_a");
        let b = visitor_key("203.0.113.9", "salt_a");
        assert_eq!(a, b);
        assert_eq!(a.len(), VISITOR_KEY_LEN);

        // different salt or address changes the key
        assert_ne!(a, visitor_key("203.0.113.9", "salt_b"));
        assert_ne!(a, visitor_key("203.0.113.10", "salt_a"));
    }

    #[test]
    fn test_visitor_key_never_contains_ip() {
        let ip = "198.51.100.77";
        let key = visitor_key(ip, "salt");
        assert!(!key.contains(ip));
        assert!(!key.contains("198.51"));
    }

    #[test]
    fn test_visitor_key_empty_input() {
        assert_eq!(visitor_key("", "salt"), "");
    }

    #[test]
    fn test_is_private_or_local_ipv4() {
        assert!(is_private_or_local(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"172.16.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"192.168.1.1".parse().unwrap()));
        assert!(is_private_or_local(&"127.0.0.1".parse().unwrap()));
        assert!(!is_private_or_local(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_or_local(&"1.1.1.1".parse().unwrap()));
    }

    #[test]
    fn test_is_private_or_local_ipv6() {
        assert!(is_private_or_local(&"::1".parse().unwrap()));
        assert!(is_private_or_local(&"fd00::1".parse().unwrap()));
        assert!(is_private_or_local(&"fc00::1".parse().unwrap()));
        assert!(is_private_or_local(&"fe80::1".parse().unwrap()));
        assert!(!is_private_or_local(
            &"2001:4860:4860::8888".parse().unwrap()
        ));
    }

    #[test]
    fn test_ip_in_cidr_ipv4() {
        let ip: IpAddr = "192.168.1.100".parse().unwrap();
        assert!(ip_in_cidr(&ip, "192.168.1.0/24"));
        assert!(ip_in_cidr(&ip, "192.168.0.0/16"));
        assert!(!ip_in_cidr(&ip, "192.168.2.0/24"));
        assert!(!ip_in_cidr(&ip, "10.0.0.0/8"));
    }

    #[test]
    fn test_ip_in_cidr_ipv6() {
        let ip: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(ip_in_cidr(&ip, "2001:db8::/32"));
        assert!(!ip_in_cidr(&ip, "2001:db9::/32"));
    }

    #[test]
    fn test_is_trusted_proxy() {
        let proxies = vec![
            "127.0.0.1".to_string(),
            "192.168.1.0/24".to_string(),
            "10.0.0.1".to_string(),
        ];

        assert!(is_trusted_proxy("127.0.0.1", &proxies));
        assert!(is_trusted_proxy("127.0.0.1:8080", &proxies));
        assert!(is_trusted_proxy("192.168.1.50", &proxies));
        assert!(is_trusted_proxy("10.0.0.1", &proxies));
        assert!(!is_trusted_proxy("8.8.8.8", &proxies));
        assert!(!is_trusted_proxy("192.168.2.1", &proxies));
    }
}
