//! Client IP resolution from proxy headers.

use std::net::IpAddr;

/// Address used when no proxy header names the client.
pub const DEFAULT_CLIENT_IP: &str = "127.0.0.1";

/// Normalize IP address to handle IPv4-mapped IPv6 addresses
///
/// Converts IPv4-mapped IPv6 addresses (e.g., `::ffff:192.168.1.1`) to their
/// plain IPv4 form. Unparseable input is returned trimmed but otherwise as-is,
/// the geolocation check rejects it later.
///
/// # Examples
///
/// ```
/// use reaction_gate::access::normalize_ip;
///
/// assert_eq!(normalize_ip("192.168.1.1"), "192.168.1.1");
/// assert_eq!(normalize_ip("::ffff:192.168.1.1"), "192.168.1.1");
/// assert_eq!(normalize_ip("2001:db8::1"), "2001:db8::1");
/// assert_eq!(normalize_ip(" invalid "), "invalid");
/// ```
pub fn normalize_ip(ip_str: &str) -> String {
    let trimmed = ip_str.trim();
    match trimmed.parse::<IpAddr>() {
        Ok(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => v6.to_string(),
        },
        Ok(IpAddr::V4(v4)) => v4.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// Pick the client IP from proxy headers
///
/// Precedence: first entry of `X-Forwarded-For`, then `X-Real-IP`, then
/// [`DEFAULT_CLIENT_IP`]. Empty header values are skipped.
///
/// # Examples
///
/// ```
/// use reaction_gate::access::resolve_client_ip;
///
/// assert_eq!(resolve_client_ip(Some("203.0.113.7, 10.0.0.1"), Some("10.0.0.2")), "203.0.113.7");
/// assert_eq!(resolve_client_ip(None, Some("198.51.100.4")), "198.51.100.4");
/// assert_eq!(resolve_client_ip(Some(""), None), "127.0.0.1");
/// ```
pub fn resolve_client_ip(forwarded_for: Option<&str>, real_ip: Option<&str>) -> String {
    let forwarded = forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let real = real_ip.map(str::trim).filter(|value| !value.is_empty());

    normalize_ip(forwarded.or(real).unwrap_or(DEFAULT_CLIENT_IP))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarded_for_takes_precedence() {
        assert_eq!(
            resolve_client_ip(Some("203.0.113.7"), Some("198.51.100.4")),
            "203.0.113.7"
        );
    }

    #[test]
    fn test_first_forwarded_hop_wins() {
        assert_eq!(
            resolve_client_ip(Some(" 203.0.113.7 , 10.0.0.1, 10.0.0.2"), None),
            "203.0.113.7"
        );
    }

    #[test]
    fn test_real_ip_fallback() {
        assert_eq!(resolve_client_ip(None, Some("198.51.100.4")), "198.51.100.4");
        assert_eq!(resolve_client_ip(Some("  "), Some("198.51.100.4")), "198.51.100.4");
    }

    #[test]
    fn test_loopback_default() {
        assert_eq!(resolve_client_ip(None, None), DEFAULT_CLIENT_IP);
    }

    #[test]
    fn test_mapped_ipv6_is_collapsed() {
        assert_eq!(resolve_client_ip(Some("::ffff:203.0.113.7"), None), "203.0.113.7");
    }
}
