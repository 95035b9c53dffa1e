//! Collaborator traits the commands drive.
//!
//! The commands never touch the network stack directly. Each external
//! service is a trait so the same driver runs against the Linux backend
//! ([`crate::netlink::NetlinkStack`], [`crate::sysfs::SysfsLister`],
//! [`crate::system`]) or the in-memory [`MemoryStack`].

mod memory;

pub use memory::{Call, MemoryStack};

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;

use crate::arp::ArpEntry;
use crate::device::{DeviceStatus, ProtocolStats};
use crate::nslookup::HostEntry;
use crate::transfer::TransferMode;
use crate::util::HwAddr;

/// Per-device configuration calls.
///
/// Every call is independent: a failure leaves earlier calls applied.
#[allow(async_fn_in_trait)]
pub trait DeviceConfig {
    async fn set_hwaddr(&self, ifname: &str, addr: &HwAddr) -> io::Result<()>;

    async fn set_mtu(&self, ifname: &str, mtu: u32) -> io::Result<()>;

    async fn set_ipv4_addr(&self, ifname: &str, addr: Ipv4Addr) -> io::Result<()>;

    async fn set_ipv4_netmask(&self, ifname: &str, mask: Ipv4Addr) -> io::Result<()>;

    /// Set the default router reached through `ifname`.
    async fn set_ipv4_gateway(&self, ifname: &str, gateway: Ipv4Addr) -> io::Result<()>;

    async fn set_ipv6_addr(&self, ifname: &str, addr: Ipv6Addr) -> io::Result<()>;

    async fn set_ipv6_netmask(&self, ifname: &str, mask: Ipv6Addr) -> io::Result<()>;

    async fn set_ipv6_gateway(&self, ifname: &str, gateway: Ipv6Addr) -> io::Result<()>;

    /// Add one address to a device holding several IPv6 addresses.
    async fn add_ipv6_addr(&self, ifname: &str, addr: Ipv6Addr, prefix_len: u8)
    -> io::Result<()>;

    /// Remove one address from a device holding several IPv6 addresses.
    async fn del_ipv6_addr(&self, ifname: &str, addr: Ipv6Addr, prefix_len: u8)
    -> io::Result<()>;

    /// Set the resolver's name server.
    async fn set_dns(&self, server: IpAddr) -> io::Result<()>;

    /// Start DHCP negotiation on `ifname`.
    async fn obtain_ipv4_addr(&self, ifname: &str) -> io::Result<()>;

    async fn set_link_up(&self, ifname: &str, up: bool) -> io::Result<()>;
}

/// Address-resolution table.
#[allow(async_fn_in_trait)]
pub trait ArpTable {
    /// Append at most `limit` entries to `out`.
    async fn dump(&self, out: &mut Vec<ArpEntry>, limit: usize) -> io::Result<()>;

    /// Get the hardware address mapped to `ip`.
    ///
    /// Fails with `ENOENT` when no mapping exists.
    async fn get(&self, ip: Ipv4Addr, ifname: Option<&str>) -> io::Result<[u8; 6]>;

    /// Insert or overwrite the mapping for `ip`.
    ///
    /// Fails with `ENETUNREACH` when no interface is given and none is on
    /// the same subnet as `ip`.
    async fn set(&self, ip: Ipv4Addr, mac: [u8; 6], ifname: Option<&str>) -> io::Result<()>;

    /// Remove the mapping for `ip`.
    async fn delete(&self, ip: Ipv4Addr, ifname: Option<&str>) -> io::Result<()>;
}

/// One entry of a device listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: String,
    /// Regular device entry, as opposed to a directory or special file.
    pub regular: bool,
}

/// Listing of registered network devices.
pub trait DeviceLister {
    type Entries: Iterator<Item = io::Result<ListedEntry>>;

    /// Open a fresh listing.
    fn open(&self) -> io::Result<Self::Entries>;

    /// Where the listing lives, for diagnostics.
    fn location(&self) -> &Path;

    /// Query the status of one device.
    fn status(&self, name: &str) -> io::Result<DeviceStatus>;

    /// Read the stack's global protocol counters.
    ///
    /// Listers without statistics report none.
    fn statistics(&self) -> io::Result<Vec<ProtocolStats>> {
        Ok(Vec::new())
    }

    /// Check if `name` is a real, queryable device.
    fn is_device(&self, name: &str) -> bool {
        self.status(name).is_ok()
    }
}

/// Host name resolution.
#[allow(async_fn_in_trait)]
pub trait NameResolver {
    async fn resolve(&self, host: &str) -> io::Result<Vec<HostEntry>>;
}

/// TFTP-style file transfer.
#[allow(async_fn_in_trait)]
pub trait TransferClient {
    /// Fetch `remote` from `host` into `local`.
    async fn get(
        &self,
        remote: &str,
        local: &Path,
        host: Ipv4Addr,
        mode: TransferMode,
    ) -> io::Result<()>;

    /// Send `local` to `remote` on `host`.
    async fn put(
        &self,
        local: &Path,
        remote: &str,
        host: Ipv4Addr,
        mode: TransferMode,
    ) -> io::Result<()>;
}

/// Receives successive chunks of a streamed download.
pub trait DownloadSink {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()>;
}

impl<W: io::Write> DownloadSink for W {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.write_all(chunk)
    }
}

/// Streamed HTTP download.
#[allow(async_fn_in_trait)]
pub trait WebClient {
    /// Fetch `url`, handing each body chunk to `sink`. Returns the byte count.
    async fn fetch(&self, url: &str, sink: &mut dyn DownloadSink) -> io::Result<u64>;
}
