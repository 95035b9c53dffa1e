//! Address parsing and formatting utilities.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::caps::LinkKind;

/// Error type for address parsing.
#[derive(Debug, thiserror::Error)]
pub enum AddrError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid prefix length: {0}")]
    InvalidPrefix(String),

    #[error("invalid MAC address: {0}")]
    InvalidMac(String),
}

pub type Result<T> = std::result::Result<T, AddrError>;

/// Longest link-layer address of any supported link kind.
pub const MAX_HWADDR_LEN: usize = 8;

/// Link-layer address of 1 to 8 octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwAddr {
    octets: [u8; MAX_HWADDR_LEN],
    len: usize,
}

impl HwAddr {
    /// Build from raw octets. Returns `None` for an empty or oversized slice.
    pub fn new(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() || bytes.len() > MAX_HWADDR_LEN {
            return None;
        }
        let mut octets = [0u8; MAX_HWADDR_LEN];
        octets[..bytes.len()].copy_from_slice(bytes);
        Some(Self {
            octets,
            len: bytes.len(),
        })
    }

    /// Get the address octets.
    pub fn as_bytes(&self) -> &[u8] {
        &self.octets[..self.len]
    }
}

impl From<[u8; 6]> for HwAddr {
    fn from(mac: [u8; 6]) -> Self {
        let mut octets = [0u8; MAX_HWADDR_LEN];
        octets[..6].copy_from_slice(&mac);
        Self { octets, len: 6 }
    }
}

impl fmt::Display for HwAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_mac(self.as_bytes()))
    }
}

/// Parse an IPv4 address in dotted-quad form.
pub fn parse_ipv4(s: &str) -> Result<Ipv4Addr> {
    s.parse()
        .map_err(|_| AddrError::InvalidAddress(s.to_string()))
}

/// Parse an IPv6 address.
pub fn parse_ipv6(s: &str) -> Result<Ipv6Addr> {
    s.parse()
        .map_err(|_| AddrError::InvalidAddress(s.to_string()))
}

/// Split `addr/len` into its parts. The length is `None` without a slash.
pub fn split_prefix(s: &str) -> (&str, Option<&str>) {
    match s.split_once('/') {
        Some((addr, len)) => (addr, Some(len)),
        None => (s, None),
    }
}

/// Parse a decimal prefix length no larger than `max`.
pub fn parse_prefix_len(s: &str, max: u8) -> Result<u8> {
    let prefix: u8 = s
        .parse()
        .map_err(|_| AddrError::InvalidPrefix(s.to_string()))?;
    if prefix > max {
        return Err(AddrError::InvalidPrefix(format!(
            "{} exceeds maximum {} for address family",
            prefix, max
        )));
    }
    Ok(prefix)
}

/// IPv4 netmask with `prefix` leading one bits.
pub fn ipv4_mask(prefix: u8) -> Ipv4Addr {
    match prefix {
        0 => Ipv4Addr::UNSPECIFIED,
        p if p >= 32 => Ipv4Addr::BROADCAST,
        p => Ipv4Addr::from(!0u32 << (32 - p)),
    }
}

/// IPv6 netmask with `prefix` leading one bits.
pub fn ipv6_mask(prefix: u8) -> Ipv6Addr {
    match prefix {
        0 => Ipv6Addr::UNSPECIFIED,
        p if p >= 128 => Ipv6Addr::from(!0u128),
        p => Ipv6Addr::from(!0u128 << (128 - p)),
    }
}

/// Number of leading one bits of an IPv4 netmask.
pub fn ipv4_prefix_len(mask: Ipv4Addr) -> u8 {
    u32::from(mask).leading_ones() as u8
}

/// Number of leading one bits of an IPv6 netmask.
pub fn ipv6_prefix_len(mask: Ipv6Addr) -> u8 {
    u128::from(mask).leading_ones() as u8
}

/// First usable host of the subnet `host` lives on.
pub fn default_gateway(host: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from((u32::from(host) & u32::from(mask)) | 1)
}

/// Parse a MAC address from string.
pub fn parse_mac(s: &str) -> Result<[u8; 6]> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 6 {
        return Err(AddrError::InvalidMac(s.to_string()));
    }

    let mut mac = [0u8; 6];
    for (i, part) in parts.iter().enumerate() {
        mac[i] = parse_octet(part).ok_or_else(|| AddrError::InvalidMac(s.to_string()))?;
    }

    Ok(mac)
}

fn parse_octet(part: &str) -> Option<u8> {
    if part.is_empty() || part.len() > 2 {
        return None;
    }
    u8::from_str_radix(part, 16).ok()
}

/// Parse colon-separated hex octets, accepting between `min` and `max` of them.
fn parse_octets(s: &str, min: usize, max: usize) -> Result<HwAddr> {
    let mut octets = [0u8; MAX_HWADDR_LEN];
    let mut len = 0;
    for part in s.split(':') {
        if len == max {
            return Err(AddrError::InvalidMac(s.to_string()));
        }
        octets[len] = parse_octet(part).ok_or_else(|| AddrError::InvalidMac(s.to_string()))?;
        len += 1;
    }
    if len < min {
        return Err(AddrError::InvalidMac(s.to_string()));
    }
    HwAddr::new(&octets[..len]).ok_or_else(|| AddrError::InvalidMac(s.to_string()))
}

/// Convert a textual hardware address to the width of `link`.
pub fn parse_hwaddr(s: &str, link: LinkKind) -> Result<HwAddr> {
    match link {
        LinkKind::Ethernet => parse_mac(s).map(HwAddr::from),
        LinkKind::Ieee802154 => parse_octets(s, 8, 8),
        LinkKind::PacketRadio => parse_octets(s, 1, 8),
        LinkKind::None => Err(AddrError::InvalidMac(s.to_string())),
    }
}

/// Format a MAC address.
pub fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Check if an IPv4 address is in a given prefix.
pub fn ipv4_in_prefix(addr: Ipv4Addr, prefix_addr: Ipv4Addr, prefix_len: u8) -> bool {
    if prefix_len == 0 {
        return true;
    }
    if prefix_len > 32 {
        return false;
    }

    let mask = u32::from(ipv4_mask(prefix_len));
    (u32::from(addr) & mask) == (u32::from(prefix_addr) & mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_prefix() {
        assert_eq!(split_prefix("10.0.0.5/24"), ("10.0.0.5", Some("24")));
        assert_eq!(split_prefix("fe80::1"), ("fe80::1", None));
    }

    #[test]
    fn test_parse_prefix_len() {
        assert_eq!(parse_prefix_len("24", 32).unwrap(), 24);
        assert!(parse_prefix_len("33", 32).is_err());
        assert_eq!(parse_prefix_len("128", 128).unwrap(), 128);
        assert!(parse_prefix_len("x", 128).is_err());
    }

    #[test]
    fn test_masks() {
        assert_eq!(ipv4_mask(24), Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(ipv4_mask(0), Ipv4Addr::UNSPECIFIED);
        assert_eq!(ipv4_mask(32), Ipv4Addr::BROADCAST);
        assert_eq!(
            ipv6_mask(64),
            "ffff:ffff:ffff:ffff::".parse::<Ipv6Addr>().unwrap()
        );
        assert_eq!(ipv4_prefix_len(Ipv4Addr::new(255, 255, 240, 0)), 20);
        assert_eq!(ipv6_prefix_len(ipv6_mask(48)), 48);
    }

    #[test]
    fn test_default_gateway() {
        assert_eq!(
            default_gateway(Ipv4Addr::new(192, 168, 7, 42), Ipv4Addr::new(255, 255, 255, 0)),
            Ipv4Addr::new(192, 168, 7, 1)
        );
        assert_eq!(
            default_gateway(Ipv4Addr::new(10, 1, 2, 3), Ipv4Addr::new(255, 0, 0, 0)),
            Ipv4Addr::new(10, 0, 0, 1)
        );
    }

    #[test]
    fn test_parse_mac() {
        let mac = parse_mac("aa:bb:cc:dd:ee:ff").unwrap();
        assert_eq!(mac, [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert!(parse_mac("aa:bb:cc:dd:ee").is_err());
        assert!(parse_mac("aa:bb:cc:dd:ee:fff").is_err());
    }

    #[test]
    fn test_parse_hwaddr_widths() {
        let eth = parse_hwaddr("00:11:22:33:44:55", LinkKind::Ethernet).unwrap();
        assert_eq!(eth.as_bytes().len(), 6);

        let ext = parse_hwaddr("00:11:22:33:44:55:66:77", LinkKind::Ieee802154).unwrap();
        assert_eq!(ext.as_bytes().len(), 8);
        assert!(parse_hwaddr("00:11:22:33:44:55", LinkKind::Ieee802154).is_err());

        let node = parse_hwaddr("0a", LinkKind::PacketRadio).unwrap();
        assert_eq!(node.as_bytes(), &[0x0a]);
        assert!(parse_hwaddr("00:11:22:33:44:55:66:77:88", LinkKind::PacketRadio).is_err());

        assert!(parse_hwaddr("00:11:22:33:44:55", LinkKind::None).is_err());
    }

    #[test]
    fn test_format_mac() {
        assert_eq!(
            format_mac(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
            "aa:bb:cc:dd:ee:ff"
        );
        assert_eq!(
            HwAddr::from([0, 1, 2, 3, 4, 5]).to_string(),
            "00:01:02:03:04:05"
        );
    }

    #[test]
    fn test_ipv4_in_prefix() {
        assert!(ipv4_in_prefix(
            Ipv4Addr::new(10, 0, 0, 7),
            Ipv4Addr::new(10, 0, 0, 1),
            24
        ));
        assert!(!ipv4_in_prefix(
            Ipv4Addr::new(10, 0, 1, 7),
            Ipv4Addr::new(10, 0, 0, 1),
            24
        ));
    }
}
