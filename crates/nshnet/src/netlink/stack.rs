//! Linux implementation of the configuration and ARP collaborators.
//!
//! Link, address, route and neighbor changes go over rtnetlink. The name
//! server is written to a resolv.conf file and DHCP runs an external
//! client.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;

use tracing::debug;

use super::connection::{Connection, ack_request, create_request, dump_request, replace_request};
use super::error::Result;
use super::message::NlMsgType;
use super::messages::{AddressMessage, NeighborMessage};
use super::types::{IfAddrMsg, IfInfoMsg, NdMsg, RtMsg, ifa, iff, ifla, nda, nud, rt};
use crate::arp::ArpEntry;
use crate::backend::{ArpTable, DeviceConfig};
use crate::config::Settings;
use crate::util::HwAddr;
use crate::util::addr::ipv4_in_prefix;
use crate::util::ifname::{index_to_name, name_to_index};

const AF_INET: u8 = libc::AF_INET as u8;
const AF_INET6: u8 = libc::AF_INET6 as u8;

/// Prefix used when an address is set on a device that has none.
const DEFAULT_IPV4_PREFIX: u8 = 24;
const DEFAULT_IPV6_PREFIX: u8 = 64;

fn family_of(addr: IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => AF_INET,
        IpAddr::V6(_) => AF_INET6,
    }
}

fn addr_bytes(addr: IpAddr) -> Vec<u8> {
    match addr {
        IpAddr::V4(a) => a.octets().to_vec(),
        IpAddr::V6(a) => a.octets().to_vec(),
    }
}

fn os_error(errno: i32) -> io::Error {
    io::Error::from_raw_os_error(errno)
}

/// rtnetlink-backed network stack.
pub struct NetlinkStack {
    conn: Connection,
    sysfs_root: PathBuf,
    resolv_conf: PathBuf,
    dhcp_client: Vec<String>,
}

impl NetlinkStack {
    /// Open a routing socket and take paths and helpers from `settings`.
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            conn: Connection::new()?,
            sysfs_root: settings.sysfs_root.clone(),
            resolv_conf: settings.resolv_conf.clone(),
            dhcp_client: settings.dhcp_client.clone(),
        })
    }

    fn ifindex(&self, ifname: &str) -> io::Result<u32> {
        Ok(name_to_index(&self.sysfs_root, ifname)?)
    }

    async fn set_link(
        &self,
        ifname: &str,
        info: impl FnOnce(&mut IfInfoMsg),
        attr: Option<(u16, &[u8])>,
    ) -> io::Result<()> {
        let mut msg = IfInfoMsg::with_index(self.ifindex(ifname)?);
        info(&mut msg);

        let mut builder = ack_request(NlMsgType::RTM_SETLINK);
        builder.append(&msg);
        if let Some((kind, data)) = attr {
            builder.append_attr(kind, data);
        }
        Ok(self.conn.request_ack(builder).await?)
    }

    async fn addresses(&self, family: u8, ifindex: Option<u32>) -> Result<Vec<AddressMessage>> {
        let mut builder = dump_request(NlMsgType::RTM_GETADDR);
        builder.append(&IfAddrMsg::new(family, 0, 0));
        let mut addrs: Vec<AddressMessage> = self.conn.dump_typed(builder).await?;
        addrs.retain(|a| {
            a.header.ifa_family == family && ifindex.is_none_or(|idx| a.ifindex() == idx)
        });
        Ok(addrs)
    }

    async fn change_address(
        &self,
        msg_type: u16,
        ifindex: u32,
        addr: IpAddr,
        prefix_len: u8,
    ) -> io::Result<()> {
        let mut builder = match msg_type {
            NlMsgType::RTM_DELADDR => ack_request(msg_type),
            _ => replace_request(msg_type),
        };
        builder.append(&IfAddrMsg::new(family_of(addr), prefix_len, ifindex));
        if addr.is_ipv4() {
            builder.append_attr(ifa::LOCAL, &addr_bytes(addr));
        }
        builder.append_attr(ifa::ADDRESS, &addr_bytes(addr));
        Ok(self.conn.request_ack(builder).await?)
    }

    /// Replace the first address of `family` on `ifname`, keeping whichever
    /// of address and prefix is not given.
    async fn readdress(
        &self,
        ifname: &str,
        family: u8,
        addr: Option<IpAddr>,
        prefix_len: Option<u8>,
    ) -> io::Result<()> {
        let ifindex = self.ifindex(ifname)?;
        let current = self.addresses(family, Some(ifindex)).await?.into_iter().next();
        let current = current.and_then(|a| Some((a.primary()?, a.prefix_len())));

        let default_prefix = if family == AF_INET {
            DEFAULT_IPV4_PREFIX
        } else {
            DEFAULT_IPV6_PREFIX
        };
        let Some(new_addr) = addr.or(current.map(|(a, _)| a)) else {
            return Err(os_error(libc::EADDRNOTAVAIL));
        };
        let new_prefix = prefix_len
            .or(current.map(|(_, p)| p))
            .unwrap_or(default_prefix);

        if let Some((old_addr, old_prefix)) = current {
            if (old_addr, old_prefix) == (new_addr, new_prefix) {
                return Ok(());
            }
            debug!(ifname, %old_addr, old_prefix, "remove address");
            self.change_address(NlMsgType::RTM_DELADDR, ifindex, old_addr, old_prefix)
                .await?;
        }
        debug!(ifname, %new_addr, new_prefix, "add address");
        self.change_address(NlMsgType::RTM_NEWADDR, ifindex, new_addr, new_prefix)
            .await
    }

    async fn set_default_route(&self, ifname: &str, gateway: IpAddr) -> io::Result<()> {
        let ifindex = self.ifindex(ifname)?;
        let mut builder = replace_request(NlMsgType::RTM_NEWROUTE);
        builder.append(&RtMsg::default_route(family_of(gateway)));
        builder.append_attr(rt::RTA_GATEWAY, &addr_bytes(gateway));
        builder.append_attr_u32(rt::RTA_OIF, ifindex);
        debug!(ifname, %gateway, "replace default route");
        Ok(self.conn.request_ack(builder).await?)
    }

    async fn neighbors(&self) -> Result<Vec<NeighborMessage>> {
        let mut builder = dump_request(NlMsgType::RTM_GETNEIGH);
        builder.append(&NdMsg::new(AF_INET, 0, 0));
        self.conn.dump_typed(builder).await
    }

    /// Resolved neighbor for `ip`, optionally on one interface.
    async fn find_neighbor(
        &self,
        ip: Ipv4Addr,
        ifindex: Option<u32>,
    ) -> io::Result<Option<(u32, [u8; 6])>> {
        let found = self.neighbors().await?.into_iter().find_map(|n| {
            let (dst, mac) = n.ipv4_mapping()?;
            let matches = dst == ip && n.is_resolved() && ifindex.is_none_or(|i| i == n.ifindex());
            matches.then(|| (n.ifindex(), mac))
        });
        Ok(found)
    }

    /// Interface with an IPv4 subnet containing `ip`.
    async fn route_for(&self, ip: Ipv4Addr) -> io::Result<Option<u32>> {
        let addrs = self.addresses(AF_INET, None).await?;
        Ok(addrs.iter().find_map(|a| match a.primary()? {
            IpAddr::V4(local) if ipv4_in_prefix(ip, local, a.prefix_len()) => Some(a.ifindex()),
            _ => None,
        }))
    }

    fn scope(&self, ifname: Option<&str>) -> io::Result<Option<u32>> {
        ifname.map(|name| self.ifindex(name)).transpose()
    }
}

impl DeviceConfig for NetlinkStack {
    async fn set_hwaddr(&self, ifname: &str, addr: &HwAddr) -> io::Result<()> {
        debug!(ifname, %addr, "set link address");
        self.set_link(ifname, |_| {}, Some((ifla::ADDRESS, addr.as_bytes())))
            .await
    }

    async fn set_mtu(&self, ifname: &str, mtu: u32) -> io::Result<()> {
        debug!(ifname, mtu, "set link mtu");
        self.set_link(ifname, |_| {}, Some((ifla::MTU, &mtu.to_ne_bytes())))
            .await
    }

    async fn set_ipv4_addr(&self, ifname: &str, addr: Ipv4Addr) -> io::Result<()> {
        self.readdress(ifname, AF_INET, Some(IpAddr::V4(addr)), None)
            .await
    }

    async fn set_ipv4_netmask(&self, ifname: &str, mask: Ipv4Addr) -> io::Result<()> {
        let prefix = crate::util::addr::ipv4_prefix_len(mask);
        self.readdress(ifname, AF_INET, None, Some(prefix)).await
    }

    async fn set_ipv4_gateway(&self, ifname: &str, gateway: Ipv4Addr) -> io::Result<()> {
        self.set_default_route(ifname, IpAddr::V4(gateway)).await
    }

    async fn set_ipv6_addr(&self, ifname: &str, addr: Ipv6Addr) -> io::Result<()> {
        self.readdress(ifname, AF_INET6, Some(IpAddr::V6(addr)), None)
            .await
    }

    async fn set_ipv6_netmask(&self, ifname: &str, mask: Ipv6Addr) -> io::Result<()> {
        let prefix = crate::util::addr::ipv6_prefix_len(mask);
        self.readdress(ifname, AF_INET6, None, Some(prefix)).await
    }

    async fn set_ipv6_gateway(&self, ifname: &str, gateway: Ipv6Addr) -> io::Result<()> {
        self.set_default_route(ifname, IpAddr::V6(gateway)).await
    }

    async fn add_ipv6_addr(
        &self,
        ifname: &str,
        addr: Ipv6Addr,
        prefix_len: u8,
    ) -> io::Result<()> {
        let ifindex = self.ifindex(ifname)?;
        let mut builder = create_request(NlMsgType::RTM_NEWADDR);
        builder.append(&IfAddrMsg::new(AF_INET6, prefix_len, ifindex));
        builder.append_attr(ifa::ADDRESS, &addr.octets());
        debug!(ifname, %addr, prefix_len, "add ipv6 address");
        Ok(self.conn.request_ack(builder).await?)
    }

    async fn del_ipv6_addr(
        &self,
        ifname: &str,
        addr: Ipv6Addr,
        prefix_len: u8,
    ) -> io::Result<()> {
        let ifindex = self.ifindex(ifname)?;
        debug!(ifname, %addr, prefix_len, "delete ipv6 address");
        self.change_address(NlMsgType::RTM_DELADDR, ifindex, IpAddr::V6(addr), prefix_len)
            .await
    }

    async fn set_dns(&self, server: IpAddr) -> io::Result<()> {
        let existing = match tokio::fs::read_to_string(&self.resolv_conf).await {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };

        let mut contents = format!("nameserver {}\n", server);
        for line in existing.lines() {
            if !line.trim_start().starts_with("nameserver") {
                contents.push_str(line);
                contents.push('\n');
            }
        }
        debug!(path = %self.resolv_conf.display(), %server, "write name server");
        tokio::fs::write(&self.resolv_conf, contents).await
    }

    async fn obtain_ipv4_addr(&self, ifname: &str) -> io::Result<()> {
        let Some((program, args)) = self.dhcp_client.split_first() else {
            return Err(os_error(libc::ENOSYS));
        };
        debug!(ifname, program, "run dhcp client");
        let status = tokio::process::Command::new(program)
            .args(args)
            .arg(ifname)
            .status()
            .await?;
        if !status.success() {
            return Err(io::Error::other(format!("{} exited with {}", program, status)));
        }
        Ok(())
    }

    async fn set_link_up(&self, ifname: &str, up: bool) -> io::Result<()> {
        debug!(ifname, up, "set link state");
        self.set_link(
            ifname,
            |msg| {
                msg.ifi_flags = if up { iff::UP } else { 0 };
                msg.ifi_change = iff::UP;
            },
            None,
        )
        .await
    }
}

impl ArpTable for NetlinkStack {
    async fn dump(&self, out: &mut Vec<ArpEntry>, limit: usize) -> io::Result<()> {
        let entries = self
            .neighbors()
            .await?
            .into_iter()
            .filter(|n| n.is_resolved())
            .filter_map(|n| {
                let (ip, mac) = n.ipv4_mapping()?;
                let ifname = index_to_name(&self.sysfs_root, n.ifindex())
                    .unwrap_or_else(|_| n.ifindex().to_string());
                Some(ArpEntry::new(ip, mac, ifname))
            })
            .take(limit);
        out.extend(entries);
        Ok(())
    }

    async fn get(&self, ip: Ipv4Addr, ifname: Option<&str>) -> io::Result<[u8; 6]> {
        let scope = self.scope(ifname)?;
        match self.find_neighbor(ip, scope).await? {
            Some((_, mac)) => Ok(mac),
            None => Err(os_error(libc::ENOENT)),
        }
    }

    async fn set(&self, ip: Ipv4Addr, mac: [u8; 6], ifname: Option<&str>) -> io::Result<()> {
        let ifindex = match self.scope(ifname)? {
            Some(idx) => idx,
            None => match self.find_neighbor(ip, None).await? {
                Some((idx, _)) => idx,
                None => self
                    .route_for(ip)
                    .await?
                    .ok_or_else(|| os_error(libc::ENETUNREACH))?,
            },
        };

        let mut builder = replace_request(NlMsgType::RTM_NEWNEIGH);
        builder.append(&NdMsg::new(AF_INET, ifindex, nud::PERMANENT));
        builder.append_attr(nda::DST, &ip.octets());
        builder.append_attr(nda::LLADDR, &mac);
        debug!(%ip, ifindex, "set neighbor");
        Ok(self.conn.request_ack(builder).await?)
    }

    async fn delete(&self, ip: Ipv4Addr, ifname: Option<&str>) -> io::Result<()> {
        let ifindex = match self.scope(ifname)? {
            Some(idx) => idx,
            None => match self.find_neighbor(ip, None).await? {
                Some((idx, _)) => idx,
                None => return Err(os_error(libc::ENOENT)),
            },
        };

        let mut builder = ack_request(NlMsgType::RTM_DELNEIGH);
        builder.append(&NdMsg::new(AF_INET, ifindex, 0));
        builder.append_attr(nda::DST, &ip.octets());
        debug!(%ip, ifindex, "delete neighbor");
        Ok(self.conn.request_ack(builder).await?)
    }
}
