//! Runtime capability set.
//!
//! Which address families, link-layer kinds and auxiliary services a
//! target supports is decided when the command layer is constructed
//! rather than when it is built.

use serde::Deserialize;

/// Link-layer address kind of the target devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// 6-octet Ethernet MAC.
    #[default]
    Ethernet,
    /// 8-octet IEEE 802.15.4 extended address.
    Ieee802154,
    /// Packet radio node address of 1 to 8 octets.
    PacketRadio,
    /// No settable link-layer address.
    None,
}

impl LinkKind {
    /// Check if devices of this kind have a settable hardware address.
    pub fn has_hwaddr(self) -> bool {
        self != LinkKind::None
    }
}

/// Address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Ipv4,
    Ipv6,
}

/// What the target supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub ipv4: bool,
    pub ipv6: bool,
    /// Several IPv6 addresses per device, managed with `add`/`del`.
    pub multi_ipv6: bool,
    /// DNS server configuration.
    pub dns: bool,
    /// DHCP client available (`ifconfig <dev> dhcp`).
    pub dhcp: bool,
    pub link: LinkKind,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            ipv4: true,
            ipv6: true,
            multi_ipv6: false,
            dns: true,
            dhcp: true,
            link: LinkKind::Ethernet,
        }
    }
}

impl Capabilities {
    /// IPv4-only target.
    pub fn ipv4_only() -> Self {
        Self {
            ipv6: false,
            multi_ipv6: false,
            ..Self::default()
        }
    }

    /// IPv6-only target.
    pub fn ipv6_only() -> Self {
        Self {
            ipv4: false,
            dhcp: false,
            ..Self::default()
        }
    }

    /// Set the multi-address IPv6 flag.
    pub fn with_multi_ipv6(mut self, enabled: bool) -> Self {
        self.multi_ipv6 = enabled;
        self
    }

    /// Set the link-layer kind.
    pub fn with_link(mut self, link: LinkKind) -> Self {
        self.link = link;
        self
    }

    /// Set DNS support.
    pub fn with_dns(mut self, enabled: bool) -> Self {
        self.dns = enabled;
        self
    }

    /// Family used when the command line does not pick one.
    ///
    /// Returns `None` when neither family is supported.
    pub fn default_family(&self) -> Option<Family> {
        if self.ipv4 {
            Some(Family::Ipv4)
        } else if self.ipv6 {
            Some(Family::Ipv6)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_family() {
        assert_eq!(Capabilities::default().default_family(), Some(Family::Ipv4));
        assert_eq!(
            Capabilities::ipv6_only().default_family(),
            Some(Family::Ipv6)
        );
        let none = Capabilities {
            ipv4: false,
            ipv6: false,
            ..Capabilities::default()
        };
        assert_eq!(none.default_family(), None);
    }

    #[test]
    fn test_deserialize_partial() {
        let caps: Capabilities =
            serde_yaml::from_str("ipv6: false\nlink: ieee802154\n").unwrap();
        assert!(caps.ipv4);
        assert!(!caps.ipv6);
        assert_eq!(caps.link, LinkKind::Ieee802154);
    }

    #[test]
    fn test_has_hwaddr() {
        assert!(LinkKind::Ethernet.has_hwaddr());
        assert!(LinkKind::PacketRadio.has_hwaddr());
        assert!(!LinkKind::None.has_hwaddr());
    }
}
