//! IPv4 / IPv6 parsing with tolerant zero padding, and padded output.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Output format for addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Padding {
    /// `127.000.000.001`, `2001:0db8:0000:0000:0000:0000:0000:0001`
    Padded,
    /// `127.0.0.1`, `2001:db8::1`
    #[default]
    Unpadded,
}

/// Parse a dotted quad, tolerating zero-padded octets (`192.168.001.010`).
pub fn parse_ipv4(text: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = text.split('.');
    for octet in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(Ipv4Addr::from(octets))
}

/// Parse an IPv6 address; an embedded IPv4 tail may be zero-padded.
pub fn parse_ipv6(text: &str) -> Option<Ipv6Addr> {
    let (head, tail) = text.rsplit_once(':')?;
    if tail.contains('.') {
        let v4 = parse_ipv4(tail)?;
        return format!("{head}:{v4}").parse().ok();
    }
    text.parse().ok()
}

/// Parse either address family.
///
/// # Examples
/// ```
/// use xmlbind::element::address::parse_address;
///
/// assert_eq!(parse_address("192.168.001.010").unwrap().to_string(), "192.168.1.10");
/// assert!(parse_address("::1").is_some());
/// assert!(parse_address("256.0.0.1").is_none());
/// ```
pub fn parse_address(text: &str) -> Option<IpAddr> {
    let text = text.trim();
    if text.contains(':') {
        parse_ipv6(text).map(IpAddr::V6)
    } else {
        parse_ipv4(text).map(IpAddr::V4)
    }
}

/// Render an address in the requested padding mode.
pub fn format_address(address: IpAddr, padding: Padding) -> String {
    match (address, padding) {
        (IpAddr::V4(v4), Padding::Padded) => {
            let [a, b, c, d] = v4.octets();
            format!("{a:03}.{b:03}.{c:03}.{d:03}")
        }
        (IpAddr::V6(v6), Padding::Padded) => v6
            .segments()
            .iter()
            .map(|segment| format!("{segment:04x}"))
            .collect::<Vec<_>>()
            .join(":"),
        (address, Padding::Unpadded) => address.to_string(),
    }
}
