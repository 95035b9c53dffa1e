//! Typed address and neighbor messages parsed from dump replies.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take;
use zerocopy::FromBytes;

use super::builder::{NLA_HDRLEN, nla_align};
use super::error::{Error, Result};
use super::types::{IfAddrMsg, NdMsg, ifa, nda, nud};

/// Result type for winnow parsers.
pub type PResult<T> = core::result::Result<T, ErrMode<ContextError>>;

/// Message payload parseable from netlink wire format.
pub trait FromNetlink: Sized {
    /// Parse from a byte slice, advancing it past the consumed bytes.
    fn parse(input: &mut &[u8]) -> PResult<Self>;

    /// Parse a complete payload.
    fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::parse
            .parse(data)
            .map_err(|e| Error::Parse(format!("{}", e)))
    }
}

fn cut<T>() -> PResult<T> {
    Err(ErrMode::Cut(ContextError::new()))
}

fn ne_u16(input: &mut &[u8]) -> PResult<u16> {
    let bytes: &[u8] = take(2usize).parse_next(input)?;
    Ok(u16::from_ne_bytes([bytes[0], bytes[1]]))
}

/// Parse a fixed header of type `T`.
fn fixed_header<T: FromBytes + Copy>(input: &mut &[u8], size: usize) -> PResult<T> {
    let bytes: &[u8] = take(size).parse_next(input)?;
    match T::read_from_bytes(bytes) {
        Ok(value) => Ok(value),
        Err(_) => cut(),
    }
}

/// Parse one attribute into `(type, payload)`, consuming its padding.
fn attr<'a>(input: &mut &'a [u8]) -> PResult<(u16, &'a [u8])> {
    let len = ne_u16(input)? as usize;
    let kind = ne_u16(input)?;
    if len < NLA_HDRLEN {
        return cut();
    }
    let payload: &[u8] = take(len - NLA_HDRLEN).parse_next(input)?;
    let padding = (nla_align(len) - len).min(input.len());
    let _: &[u8] = take(padding).parse_next(input)?;
    Ok((kind & 0x3fff, payload))
}

fn ip_addr(data: &[u8], family: u8) -> Option<IpAddr> {
    match i32::from(family) {
        libc::AF_INET => <[u8; 4]>::try_from(data)
            .ok()
            .map(|b| IpAddr::V4(Ipv4Addr::from(b))),
        libc::AF_INET6 => <[u8; 16]>::try_from(data)
            .ok()
            .map(|b| IpAddr::V6(Ipv6Addr::from(b))),
        _ => None,
    }
}

/// One interface address (RTM_NEWADDR).
#[derive(Debug, Clone, Default)]
pub struct AddressMessage {
    pub header: IfAddrMsg,
    /// IFA_ADDRESS.
    pub address: Option<IpAddr>,
    /// IFA_LOCAL.
    pub local: Option<IpAddr>,
}

impl AddressMessage {
    pub fn ifindex(&self) -> u32 {
        self.header.ifa_index
    }

    pub fn prefix_len(&self) -> u8 {
        self.header.ifa_prefixlen
    }

    /// The interface's own address: IFA_LOCAL when present (IPv4
    /// point-to-point), else IFA_ADDRESS.
    pub fn primary(&self) -> Option<IpAddr> {
        self.local.or(self.address)
    }
}

impl FromNetlink for AddressMessage {
    fn parse(input: &mut &[u8]) -> PResult<Self> {
        let header: IfAddrMsg = fixed_header(input, IfAddrMsg::SIZE)?;
        let mut msg = AddressMessage {
            header,
            ..Default::default()
        };

        while input.len() >= NLA_HDRLEN {
            let (kind, data) = attr(input)?;
            match kind {
                ifa::ADDRESS => msg.address = ip_addr(data, header.ifa_family),
                ifa::LOCAL => msg.local = ip_addr(data, header.ifa_family),
                _ => {}
            }
        }
        Ok(msg)
    }
}

/// One neighbor cache entry (RTM_NEWNEIGH).
#[derive(Debug, Clone, Default)]
pub struct NeighborMessage {
    pub header: NdMsg,
    /// NDA_DST.
    pub destination: Option<IpAddr>,
    /// NDA_LLADDR.
    pub lladdr: Option<Vec<u8>>,
}

impl NeighborMessage {
    pub fn ifindex(&self) -> u32 {
        self.header.ndm_ifindex as u32
    }

    /// IPv4 destination mapped to an Ethernet address.
    pub fn ipv4_mapping(&self) -> Option<(Ipv4Addr, [u8; 6])> {
        let IpAddr::V4(ip) = self.destination? else {
            return None;
        };
        let mac = <[u8; 6]>::try_from(self.lladdr.as_deref()?).ok()?;
        Some((ip, mac))
    }

    /// Check if the entry holds a usable mapping.
    pub fn is_resolved(&self) -> bool {
        self.header.ndm_state & (nud::INCOMPLETE | nud::FAILED | nud::NOARP) == 0
    }
}

impl FromNetlink for NeighborMessage {
    fn parse(input: &mut &[u8]) -> PResult<Self> {
        let header: NdMsg = fixed_header(input, NdMsg::SIZE)?;
        let mut msg = NeighborMessage {
            header,
            ..Default::default()
        };

        while input.len() >= NLA_HDRLEN {
            let (kind, data) = attr(input)?;
            match kind {
                nda::DST => msg.destination = ip_addr(data, header.ndm_family),
                nda::LLADDR => msg.lladdr = Some(data.to_vec()),
                _ => {}
            }
        }
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::builder::MessageBuilder;
    use crate::netlink::message::NLMSG_HDRLEN;

    /// Encode a payload the way the kernel frames it, then strip the header.
    fn payload(build: impl FnOnce(&mut MessageBuilder)) -> Vec<u8> {
        let mut builder = MessageBuilder::new(0, 0);
        build(&mut builder);
        builder.finish()[NLMSG_HDRLEN..].to_vec()
    }

    #[test]
    fn test_parse_neighbor() {
        let data = payload(|b| {
            b.append(&NdMsg::new(libc::AF_INET as u8, 2, nud::PERMANENT));
            b.append_attr(nda::DST, &[10, 0, 0, 7]);
            b.append_attr(nda::LLADDR, &[0, 0x11, 0x22, 0x33, 0x44, 0x55]);
        });

        let msg = NeighborMessage::from_bytes(&data).unwrap();
        assert_eq!(msg.ifindex(), 2);
        assert!(msg.is_resolved());
        assert_eq!(
            msg.ipv4_mapping(),
            Some((Ipv4Addr::new(10, 0, 0, 7), [0, 0x11, 0x22, 0x33, 0x44, 0x55]))
        );
    }

    #[test]
    fn test_incomplete_neighbor() {
        let data = payload(|b| {
            b.append(&NdMsg::new(libc::AF_INET as u8, 2, nud::INCOMPLETE));
            b.append_attr(nda::DST, &[10, 0, 0, 8]);
        });
        let msg = NeighborMessage::from_bytes(&data).unwrap();
        assert!(!msg.is_resolved());
        assert_eq!(msg.ipv4_mapping(), None);
    }

    #[test]
    fn test_parse_address() {
        let data = payload(|b| {
            b.append(&IfAddrMsg::new(libc::AF_INET as u8, 24, 3));
            b.append_attr(ifa::ADDRESS, &[192, 168, 1, 20]);
            b.append_attr(ifa::LOCAL, &[192, 168, 1, 21]);
        });
        let msg = AddressMessage::from_bytes(&data).unwrap();
        assert_eq!(msg.ifindex(), 3);
        assert_eq!(msg.prefix_len(), 24);
        assert_eq!(msg.primary(), Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 21))));
    }

    #[test]
    fn test_parse_ipv6_address() {
        let addr: Ipv6Addr = "fc00::2".parse().unwrap();
        let data = payload(|b| {
            b.append(&IfAddrMsg::new(libc::AF_INET6 as u8, 64, 3));
            b.append_attr(ifa::ADDRESS, &addr.octets());
        });
        let msg = AddressMessage::from_bytes(&data).unwrap();
        assert_eq!(msg.primary(), Some(IpAddr::V6(addr)));
    }

    #[test]
    fn test_truncated_header() {
        assert!(NeighborMessage::from_bytes(&[2, 0, 0]).is_err());
    }
}
