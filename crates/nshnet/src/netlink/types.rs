//! Fixed-size rtnetlink family headers and attribute numbers.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Interface info message (struct ifinfomsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfInfoMsg {
    pub ifi_family: u8,
    pub ifi_pad: u8,
    pub ifi_type: u16,
    pub ifi_index: i32,
    pub ifi_flags: u32,
    pub ifi_change: u32,
}

impl IfInfoMsg {
    pub fn with_index(index: u32) -> Self {
        Self {
            ifi_index: index as i32,
            ..Default::default()
        }
    }
}

/// Interface address message (struct ifaddrmsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfAddrMsg {
    pub ifa_family: u8,
    pub ifa_prefixlen: u8,
    pub ifa_flags: u8,
    pub ifa_scope: u8,
    pub ifa_index: u32,
}

impl IfAddrMsg {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(family: u8, prefixlen: u8, index: u32) -> Self {
        Self {
            ifa_family: family,
            ifa_prefixlen: prefixlen,
            ifa_index: index,
            ..Default::default()
        }
    }
}

/// Route message (struct rtmsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct RtMsg {
    pub rtm_family: u8,
    pub rtm_dst_len: u8,
    pub rtm_src_len: u8,
    pub rtm_tos: u8,
    pub rtm_table: u8,
    pub rtm_protocol: u8,
    pub rtm_scope: u8,
    pub rtm_type: u8,
    pub rtm_flags: u32,
}

impl RtMsg {
    /// Default route in the main table.
    pub fn default_route(family: u8) -> Self {
        Self {
            rtm_family: family,
            rtm_table: rt::TABLE_MAIN,
            rtm_protocol: rt::PROT_BOOT,
            rtm_scope: rt::SCOPE_UNIVERSE,
            rtm_type: rt::UNICAST,
            ..Default::default()
        }
    }
}

/// Neighbor message (struct ndmsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NdMsg {
    pub ndm_family: u8,
    pub ndm_pad1: u8,
    pub ndm_pad2: u16,
    pub ndm_ifindex: i32,
    /// Neighbor state (NUD_*).
    pub ndm_state: u16,
    pub ndm_flags: u8,
    pub ndm_type: u8,
}

impl NdMsg {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(family: u8, ifindex: u32, state: u16) -> Self {
        Self {
            ndm_family: family,
            ndm_ifindex: ifindex as i32,
            ndm_state: state,
            ..Default::default()
        }
    }
}

/// Link attributes (IFLA_*).
pub mod ifla {
    pub const ADDRESS: u16 = 1;
    pub const MTU: u16 = 4;
}

/// Address attributes (IFA_*).
pub mod ifa {
    pub const ADDRESS: u16 = 1;
    pub const LOCAL: u16 = 2;
}

/// Route attributes and constants (RTA_*, RT_*, RTN_*, RTPROT_*).
pub mod rt {
    pub const RTA_GATEWAY: u16 = 5;
    pub const RTA_OIF: u16 = 4;

    pub const TABLE_MAIN: u8 = 254;
    pub const PROT_BOOT: u8 = 3;
    pub const SCOPE_UNIVERSE: u8 = 0;
    pub const UNICAST: u8 = 1;
}

/// Neighbor attributes (NDA_*).
pub mod nda {
    pub const DST: u16 = 1;
    pub const LLADDR: u16 = 2;
}

/// Neighbor states (NUD_*).
pub mod nud {
    pub const INCOMPLETE: u16 = 0x01;
    pub const FAILED: u16 = 0x20;
    pub const NOARP: u16 = 0x40;
    pub const PERMANENT: u16 = 0x80;
}

/// Interface flags (IFF_*).
pub mod iff {
    pub const UP: u32 = 0x1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_sizes() {
        assert_eq!(std::mem::size_of::<IfInfoMsg>(), 16);
        assert_eq!(IfAddrMsg::SIZE, 8);
        assert_eq!(std::mem::size_of::<RtMsg>(), 12);
        assert_eq!(NdMsg::SIZE, 12);
    }

    #[test]
    fn test_ndmsg_layout() {
        let msg = NdMsg::new(libc::AF_INET as u8, 3, nud::PERMANENT);
        let bytes = msg.as_bytes();
        assert_eq!(bytes[0], libc::AF_INET as u8);
        assert_eq!(&bytes[4..8], &3i32.to_ne_bytes());
        assert_eq!(&bytes[8..10], &nud::PERMANENT.to_ne_bytes());
    }
}
