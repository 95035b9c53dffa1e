//! Conversion of classified `ifconfig` text into binary configuration.
//!
//! Every conversion happens here, before any device call, so a bad value
//! never leaves the interface half configured.

use std::net::{Ipv4Addr, Ipv6Addr};

use tracing::debug;

use super::COMMAND;
use super::classify::{AddressAction, FamilySelector, ParsedConfigRequest};
use crate::caps::{Capabilities, Family};
use crate::error::{Error, Result};
use crate::util::HwAddr;
use crate::util::addr::{
    default_gateway, ipv4_mask, ipv4_prefix_len, ipv6_mask, ipv6_prefix_len, parse_ipv4, parse_ipv6, parse_prefix_len, split_prefix,
};

/// Host literal requesting DHCP.
pub const DHCP_HOST: &str = "dhcp";

/// Netmask used when an IPv4 request gives neither a mask nor a prefix.
pub const DEFAULT_IPV4_NETMASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// Prefix length used when an IPv6 request gives neither a mask nor a prefix.
pub const DEFAULT_IPV6_PREFIX: u8 = 64;

/// Resolved IPv4 settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Config {
    pub host: Option<Ipv4Addr>,
    pub netmask: Ipv4Addr,
    pub prefix_len: u8,
    /// Explicit, or derived from the host.
    pub gateway: Option<Ipv4Addr>,
    pub dns: Option<Ipv4Addr>,
}

/// Resolved IPv6 settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv6Config {
    pub host: Option<Ipv6Addr>,
    pub netmask: Ipv6Addr,
    pub prefix_len: u8,
    /// Only set when given explicitly.
    pub gateway: Option<Ipv6Addr>,
    pub dns: Option<Ipv6Addr>,
    /// Set on devices holding several addresses; the address is then
    /// added or removed instead of replacing the current one.
    pub multi: Option<AddressAction>,
}

/// Address settings of one family, or a DHCP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAddressSet {
    Ipv4(Ipv4Config),
    Ipv6(Ipv6Config),
    Dhcp,
}

impl ResolvedAddressSet {
    pub fn family(&self) -> Family {
        match self {
            ResolvedAddressSet::Ipv6(_) => Family::Ipv6,
            _ => Family::Ipv4,
        }
    }
}

/// Everything the sequencer pushes for one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceConfig<'a> {
    pub ifname: &'a str,
    pub hwaddr: Option<HwAddr>,
    pub mtu: Option<u32>,
    pub addresses: ResolvedAddressSet,
}

/// Resolve a classified request.
pub fn resolve<'a>(
    request: &ParsedConfigRequest<'a>,
    caps: &Capabilities,
) -> Result<InterfaceConfig<'a>> {
    let family = match request.family {
        FamilySelector::Ipv4 => Family::Ipv4,
        FamilySelector::Ipv6 => Family::Ipv6,
        FamilySelector::Unspecified => caps
            .default_family()
            .ok_or_else(|| Error::invalid(COMMAND, request.ifname))?,
    };

    let addresses = match family {
        Family::Ipv4 if caps.dhcp && request.host == Some(DHCP_HOST) => ResolvedAddressSet::Dhcp,
        Family::Ipv4 => ResolvedAddressSet::Ipv4(resolve_ipv4(request, caps)?),
        Family::Ipv6 => ResolvedAddressSet::Ipv6(resolve_ipv6(request, caps)?),
    };
    debug!(ifname = request.ifname, ?addresses, "resolved");

    Ok(InterfaceConfig {
        ifname: request.ifname,
        hwaddr: request.hwaddr,
        mtu: request.mtu,
        addresses,
    })
}

/// Split the host into address text and the prefix length to use.
///
/// An explicit `prefixlen` wins over one embedded in the host.
fn host_and_prefix<'a>(
    request: &ParsedConfigRequest<'a>,
    max: u8,
) -> Result<(Option<&'a str>, Option<u8>)> {
    let (host, embedded) = match request.host {
        Some(host) => {
            let (addr, len) = split_prefix(host);
            (Some(addr), len)
        }
        None => (None, None),
    };
    let prefix = request
        .prefixlen
        .or(embedded)
        .map(|p| parse_prefix_len(p, max).map_err(|_| Error::invalid(COMMAND, p)))
        .transpose()?;
    Ok((host, prefix))
}

/// Explicit DNS server, else the gateway that will be applied.
///
/// The server must belong to the request's family.
fn resolve_dns<A>(
    request: &ParsedConfigRequest<'_>,
    caps: &Capabilities,
    gateway: Option<A>,
    parse: impl Fn(&str) -> crate::util::addr::Result<A>,
) -> Result<Option<A>> {
    if !caps.dns {
        return Ok(None);
    }
    match request.dns {
        Some(dns) => parse(dns)
            .map(Some)
            .map_err(|_| Error::invalid(COMMAND, dns)),
        None => Ok(gateway),
    }
}

fn resolve_ipv4(request: &ParsedConfigRequest<'_>, caps: &Capabilities) -> Result<Ipv4Config> {
    let (host, prefix) = host_and_prefix(request, 32)?;
    let host = host
        .map(|h| parse_ipv4(h).map_err(|_| Error::invalid(COMMAND, h)))
        .transpose()?;

    let netmask = match (request.netmask, prefix) {
        (Some(mask), _) => parse_ipv4(mask).map_err(|_| Error::invalid(COMMAND, mask))?,
        (None, Some(prefix)) => ipv4_mask(prefix),
        (None, None) => DEFAULT_IPV4_NETMASK,
    };

    let gateway = match request.gateway {
        Some(gw) => Some(parse_ipv4(gw).map_err(|_| Error::invalid(COMMAND, gw))?),
        None => host.map(|h| default_gateway(h, netmask)),
    };

    let dns = resolve_dns(request, caps, gateway, parse_ipv4)?;

    Ok(Ipv4Config {
        host,
        netmask,
        prefix_len: ipv4_prefix_len(netmask),
        gateway,
        dns,
    })
}

fn resolve_ipv6(request: &ParsedConfigRequest<'_>, caps: &Capabilities) -> Result<Ipv6Config> {
    let (host, prefix) = host_and_prefix(request, 128)?;
    let host = host
        .map(|h| parse_ipv6(h).map_err(|_| Error::invalid(COMMAND, h)))
        .transpose()?;

    let netmask = match (request.netmask, prefix) {
        (Some(mask), _) => parse_ipv6(mask).map_err(|_| Error::invalid(COMMAND, mask))?,
        (None, Some(prefix)) => ipv6_mask(prefix),
        (None, None) => ipv6_mask(DEFAULT_IPV6_PREFIX),
    };

    let gateway = request
        .gateway
        .map(|gw| parse_ipv6(gw).map_err(|_| Error::invalid(COMMAND, gw)))
        .transpose()?;

    let multi = if caps.multi_ipv6 {
        let action = request.action.unwrap_or(AddressAction::Add);
        if host.is_none() && request.action.is_some() {
            let option = match action {
                AddressAction::Add => "add",
                AddressAction::Delete => "del",
            };
            return Err(Error::missing_option(COMMAND, option));
        }
        Some(action)
    } else {
        None
    };

    let dns = resolve_dns(request, caps, gateway, parse_ipv6)?;

    Ok(Ipv6Config {
        host,
        netmask,
        prefix_len: ipv6_prefix_len(netmask),
        gateway,
        dns,
        multi,
    })
}
