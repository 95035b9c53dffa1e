//! In-memory network stack.
//!
//! Implements every collaborator trait over plain data structures and
//! records each configuration call, so command sequences can be checked
//! without touching the host. The CLI uses it for `--dry-run`.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{
    ArpTable, DeviceConfig, DeviceLister, DownloadSink, ListedEntry, NameResolver, TransferClient,
    WebClient,
};
use crate::arp::ArpEntry;
use crate::device::{DeviceStatus, ProtocolStats};
use crate::nslookup::HostEntry;
use crate::transfer::TransferMode;
use crate::util::HwAddr;
use crate::util::addr::{format_mac, ipv4_in_prefix, ipv4_prefix_len};

/// One recorded collaborator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetHwAddr(String, HwAddr),
    SetMtu(String, u32),
    SetIpv4Addr(String, Ipv4Addr),
    SetIpv4Netmask(String, Ipv4Addr),
    SetIpv4Gateway(String, Ipv4Addr),
    SetIpv6Addr(String, Ipv6Addr),
    SetIpv6Netmask(String, Ipv6Addr),
    SetIpv6Gateway(String, Ipv6Addr),
    AddIpv6Addr(String, Ipv6Addr, u8),
    DelIpv6Addr(String, Ipv6Addr, u8),
    SetDns(IpAddr),
    ObtainIpv4Addr(String),
    SetLink(String, bool),
    ArpSet(Ipv4Addr, [u8; 6], String),
    ArpDelete(Ipv4Addr),
    TftpGet {
        remote: String,
        local: PathBuf,
        host: Ipv4Addr,
        mode: TransferMode,
    },
    TftpPut {
        local: PathBuf,
        remote: String,
        host: Ipv4Addr,
        mode: TransferMode,
    },
    Fetch(String),
}

#[derive(Debug, Clone, Default)]
struct Device {
    up: bool,
    mtu: u32,
    hwaddr: Option<HwAddr>,
    ipv4: Option<Ipv4Addr>,
    netmask: Option<Ipv4Addr>,
    gateway: Option<Ipv4Addr>,
    ipv6: Option<Ipv6Addr>,
    ipv6_mask: Option<Ipv6Addr>,
    ipv6_gateway: Option<Ipv6Addr>,
    ipv6_extra: Vec<(Ipv6Addr, u8)>,
}

#[derive(Debug)]
struct State {
    devices: BTreeMap<String, Device>,
    extra_entries: Vec<ListedEntry>,
    listing_available: bool,
    statistics: Vec<ProtocolStats>,
    dns: Option<IpAddr>,
    arp: VecDeque<ArpEntry>,
    arp_capacity: usize,
    hosts: HashMap<String, Vec<HostEntry>>,
    documents: HashMap<String, Vec<u8>>,
    failures: HashMap<&'static str, i32>,
    calls: Vec<Call>,
}

/// In-memory stack with a fixed-capacity ARP table.
#[derive(Debug)]
pub struct MemoryStack {
    state: Mutex<State>,
}

/// Chunk size used when streaming stored documents.
const CHUNK_SIZE: usize = 512;

impl MemoryStack {
    /// Create an empty stack whose ARP table holds `arp_capacity` entries.
    pub fn new(arp_capacity: usize) -> Self {
        Self {
            state: Mutex::new(State {
                devices: BTreeMap::new(),
                extra_entries: Vec::new(),
                listing_available: true,
                statistics: Vec::new(),
                dns: None,
                arp: VecDeque::new(),
                arp_capacity: arp_capacity.max(1),
                hosts: HashMap::new(),
                documents: HashMap::new(),
                failures: HashMap::new(),
                calls: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a device with a 1500-byte MTU.
    pub fn add_device(&self, name: &str) {
        self.lock().devices.insert(
            name.to_string(),
            Device {
                mtu: 1500,
                ..Default::default()
            },
        );
    }

    /// Register a device holding an IPv4 address.
    pub fn add_device_with_ipv4(&self, name: &str, addr: Ipv4Addr, netmask: Ipv4Addr) {
        self.lock().devices.insert(
            name.to_string(),
            Device {
                mtu: 1500,
                ipv4: Some(addr),
                netmask: Some(netmask),
                ..Default::default()
            },
        );
    }

    /// Add a listing entry that is not a registered device.
    pub fn add_listing_entry(&self, name: &str, regular: bool) {
        self.lock().extra_entries.push(ListedEntry {
            name: name.to_string(),
            regular,
        });
    }

    /// Make opening the device listing fail with `ENOENT`.
    pub fn set_listing_available(&self, available: bool) {
        self.lock().listing_available = available;
    }

    /// Register a resolvable host.
    pub fn add_host(&self, name: &str, entries: Vec<HostEntry>) {
        self.lock().hosts.insert(name.to_string(), entries);
    }

    /// Register a downloadable document.
    pub fn add_document(&self, url: &str, body: &[u8]) {
        self.lock().documents.insert(url.to_string(), body.to_vec());
    }

    /// Make every later call of `operation` fail with `errno`.
    ///
    /// Operation names follow the trait method names; ARP table methods
    /// are prefixed with `arp_`, transfer methods with `tftp_`.
    pub fn fail_on(&self, operation: &'static str, errno: i32) {
        self.lock().failures.insert(operation, errno);
    }

    /// Set the protocol counters reported by the listing.
    pub fn set_statistics(&self, statistics: Vec<ProtocolStats>) {
        self.lock().statistics = statistics;
    }

    /// Insert an ARP entry directly, honouring the capacity.
    pub fn insert_arp(&self, entry: ArpEntry) {
        let mut state = self.lock();
        state.arp_insert(entry);
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Configured name server.
    pub fn dns(&self) -> Option<IpAddr> {
        self.lock().dns
    }

    /// Status of a registered device.
    pub fn device_status(&self, name: &str) -> Option<DeviceStatus> {
        let state = self.lock();
        state.devices.get(name).map(|dev| dev.status(name))
    }

    /// Record `call` against `ifname` unless a failure is injected or the
    /// device is unknown; then apply `update`.
    fn configure(
        &self,
        operation: &'static str,
        ifname: &str,
        call: Call,
        update: impl FnOnce(&mut Device),
    ) -> io::Result<()> {
        let mut state = self.lock();
        state.check(operation)?;
        let device = state
            .devices
            .get_mut(ifname)
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ENODEV))?;
        update(device);
        state.calls.push(call);
        Ok(())
    }
}

impl Default for MemoryStack {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_ARP_TABLE_SIZE)
    }
}

impl State {
    fn check(&self, operation: &str) -> io::Result<()> {
        match self.failures.get(operation) {
            Some(errno) => Err(io::Error::from_raw_os_error(*errno)),
            None => Ok(()),
        }
    }

    fn arp_position(&self, ip: Ipv4Addr, ifname: Option<&str>) -> Option<usize> {
        self.arp
            .iter()
            .position(|e| e.ip == ip && ifname.is_none_or(|name| e.ifname == name))
    }

    fn arp_insert(&mut self, entry: ArpEntry) {
        if let Some(pos) = self.arp_position(entry.ip, Some(&entry.ifname)) {
            self.arp[pos] = entry;
            return;
        }
        if self.arp.len() == self.arp_capacity {
            self.arp.pop_front();
        }
        self.arp.push_back(entry);
    }

    /// Interface whose IPv4 subnet contains `ip`.
    fn route_for(&self, ip: Ipv4Addr) -> Option<String> {
        self.devices.iter().find_map(|(name, dev)| {
            let addr = dev.ipv4?;
            let prefix = ipv4_prefix_len(dev.netmask?);
            ipv4_in_prefix(ip, addr, prefix).then(|| name.clone())
        })
    }
}

impl Device {
    fn status(&self, name: &str) -> DeviceStatus {
        let mut ipv6: Vec<(Ipv6Addr, u8)> = self
            .ipv6
            .map(|addr| {
                let prefix = self.ipv6_mask.map(crate::util::addr::ipv6_prefix_len);
                (addr, prefix.unwrap_or(64))
            })
            .into_iter()
            .collect();
        ipv6.extend(self.ipv6_extra.iter().copied());

        DeviceStatus {
            name: name.to_string(),
            up: self.up,
            mtu: Some(self.mtu),
            hwaddr: self.hwaddr.map(|hw| format_mac(hw.as_bytes())),
            ipv4: self.ipv4,
            netmask: self.netmask,
            ipv6,
            rx_bytes: Some(0),
            tx_bytes: Some(0),
        }
    }
}

impl DeviceConfig for MemoryStack {
    async fn set_hwaddr(&self, ifname: &str, addr: &HwAddr) -> io::Result<()> {
        let addr = *addr;
        self.configure(
            "set_hwaddr",
            ifname,
            Call::SetHwAddr(ifname.into(), addr),
            |dev| dev.hwaddr = Some(addr),
        )
    }

    async fn set_mtu(&self, ifname: &str, mtu: u32) -> io::Result<()> {
        self.configure("set_mtu", ifname, Call::SetMtu(ifname.into(), mtu), |dev| {
            dev.mtu = mtu
        })
    }

    async fn set_ipv4_addr(&self, ifname: &str, addr: Ipv4Addr) -> io::Result<()> {
        self.configure(
            "set_ipv4_addr",
            ifname,
            Call::SetIpv4Addr(ifname.into(), addr),
            |dev| dev.ipv4 = Some(addr),
        )
    }

    async fn set_ipv4_netmask(&self, ifname: &str, mask: Ipv4Addr) -> io::Result<()> {
        self.configure(
            "set_ipv4_netmask",
            ifname,
            Call::SetIpv4Netmask(ifname.into(), mask),
            |dev| dev.netmask = Some(mask),
        )
    }

    async fn set_ipv4_gateway(&self, ifname: &str, gateway: Ipv4Addr) -> io::Result<()> {
        self.configure(
            "set_ipv4_gateway",
            ifname,
            Call::SetIpv4Gateway(ifname.into(), gateway),
            |dev| dev.gateway = Some(gateway),
        )
    }

    async fn set_ipv6_addr(&self, ifname: &str, addr: Ipv6Addr) -> io::Result<()> {
        self.configure(
            "set_ipv6_addr",
            ifname,
            Call::SetIpv6Addr(ifname.into(), addr),
            |dev| dev.ipv6 = Some(addr),
        )
    }

    async fn set_ipv6_netmask(&self, ifname: &str, mask: Ipv6Addr) -> io::Result<()> {
        self.configure(
            "set_ipv6_netmask",
            ifname,
            Call::SetIpv6Netmask(ifname.into(), mask),
            |dev| dev.ipv6_mask = Some(mask),
        )
    }

    async fn set_ipv6_gateway(&self, ifname: &str, gateway: Ipv6Addr) -> io::Result<()> {
        self.configure(
            "set_ipv6_gateway",
            ifname,
            Call::SetIpv6Gateway(ifname.into(), gateway),
            |dev| dev.ipv6_gateway = Some(gateway),
        )
    }

    async fn add_ipv6_addr(
        &self,
        ifname: &str,
        addr: Ipv6Addr,
        prefix_len: u8,
    ) -> io::Result<()> {
        self.configure(
            "add_ipv6_addr",
            ifname,
            Call::AddIpv6Addr(ifname.into(), addr, prefix_len),
            |dev| {
                dev.ipv6_extra.retain(|(a, _)| *a != addr);
                dev.ipv6_extra.push((addr, prefix_len));
            },
        )
    }

    async fn del_ipv6_addr(
        &self,
        ifname: &str,
        addr: Ipv6Addr,
        prefix_len: u8,
    ) -> io::Result<()> {
        let mut state = self.lock();
        state.check("del_ipv6_addr")?;
        let dev = state
            .devices
            .get_mut(ifname)
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ENODEV))?;
        let before = dev.ipv6_extra.len();
        dev.ipv6_extra
            .retain(|(a, p)| !(*a == addr && *p == prefix_len));
        if dev.ipv6_extra.len() == before {
            return Err(io::Error::from_raw_os_error(libc::EADDRNOTAVAIL));
        }
        state
            .calls
            .push(Call::DelIpv6Addr(ifname.into(), addr, prefix_len));
        Ok(())
    }

    async fn set_dns(&self, server: IpAddr) -> io::Result<()> {
        let mut state = self.lock();
        state.check("set_dns")?;
        state.dns = Some(server);
        state.calls.push(Call::SetDns(server));
        Ok(())
    }

    async fn obtain_ipv4_addr(&self, ifname: &str) -> io::Result<()> {
        self.configure(
            "obtain_ipv4_addr",
            ifname,
            Call::ObtainIpv4Addr(ifname.into()),
            |_| {},
        )
    }

    async fn set_link_up(&self, ifname: &str, up: bool) -> io::Result<()> {
        self.configure(
            "set_link_up",
            ifname,
            Call::SetLink(ifname.into(), up),
            |dev| dev.up = up,
        )
    }
}

impl ArpTable for MemoryStack {
    async fn dump(&self, out: &mut Vec<ArpEntry>, limit: usize) -> io::Result<()> {
        let state = self.lock();
        state.check("arp_dump")?;
        out.extend(state.arp.iter().take(limit).cloned());
        Ok(())
    }

    async fn get(&self, ip: Ipv4Addr, ifname: Option<&str>) -> io::Result<[u8; 6]> {
        let state = self.lock();
        state.check("arp_get")?;
        state
            .arp_position(ip, ifname)
            .map(|pos| state.arp[pos].mac)
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ENOENT))
    }

    async fn set(&self, ip: Ipv4Addr, mac: [u8; 6], ifname: Option<&str>) -> io::Result<()> {
        let mut state = self.lock();
        state.check("arp_set")?;
        let ifname = match ifname {
            Some(name) if state.devices.contains_key(name) => name.to_string(),
            Some(_) => return Err(io::Error::from_raw_os_error(libc::ENODEV)),
            None => match state.arp_position(ip, None) {
                Some(pos) => state.arp[pos].ifname.clone(),
                None => state
                    .route_for(ip)
                    .ok_or_else(|| io::Error::from_raw_os_error(libc::ENETUNREACH))?,
            },
        };
        state.calls.push(Call::ArpSet(ip, mac, ifname.clone()));
        state.arp_insert(ArpEntry::new(ip, mac, ifname));
        Ok(())
    }

    async fn delete(&self, ip: Ipv4Addr, ifname: Option<&str>) -> io::Result<()> {
        let mut state = self.lock();
        state.check("arp_delete")?;
        let pos = state
            .arp_position(ip, ifname)
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ENOENT))?;
        state.arp.remove(pos);
        state.calls.push(Call::ArpDelete(ip));
        Ok(())
    }
}

impl DeviceLister for MemoryStack {
    type Entries = std::vec::IntoIter<io::Result<ListedEntry>>;

    fn open(&self) -> io::Result<Self::Entries> {
        let state = self.lock();
        if !state.listing_available {
            return Err(io::Error::from_raw_os_error(libc::ENOENT));
        }
        let entries: Vec<io::Result<ListedEntry>> = state
            .devices
            .keys()
            .map(|name| ListedEntry {
                name: name.clone(),
                regular: true,
            })
            .chain(state.extra_entries.iter().cloned())
            .map(Ok)
            .collect();
        Ok(entries.into_iter())
    }

    fn location(&self) -> &Path {
        Path::new("memory")
    }

    fn status(&self, name: &str) -> io::Result<DeviceStatus> {
        self.device_status(name)
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ENODEV))
    }

    fn statistics(&self) -> io::Result<Vec<ProtocolStats>> {
        let state = self.lock();
        state.check("statistics")?;
        Ok(state.statistics.clone())
    }
}

impl NameResolver for MemoryStack {
    async fn resolve(&self, host: &str) -> io::Result<Vec<HostEntry>> {
        let state = self.lock();
        state.check("resolve")?;
        if let Ok(addr) = host.parse::<IpAddr>() {
            return Ok(vec![HostEntry::new(host, addr)]);
        }
        state
            .hosts
            .get(host)
            .cloned()
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ENOENT))
    }
}

impl TransferClient for MemoryStack {
    async fn get(
        &self,
        remote: &str,
        local: &Path,
        host: Ipv4Addr,
        mode: TransferMode,
    ) -> io::Result<()> {
        let mut state = self.lock();
        state.check("tftp_get")?;
        state.calls.push(Call::TftpGet {
            remote: remote.to_string(),
            local: local.to_path_buf(),
            host,
            mode,
        });
        Ok(())
    }

    async fn put(
        &self,
        local: &Path,
        remote: &str,
        host: Ipv4Addr,
        mode: TransferMode,
    ) -> io::Result<()> {
        let mut state = self.lock();
        state.check("tftp_put")?;
        state.calls.push(Call::TftpPut {
            local: local.to_path_buf(),
            remote: remote.to_string(),
            host,
            mode,
        });
        Ok(())
    }
}

impl WebClient for MemoryStack {
    async fn fetch(&self, url: &str, sink: &mut dyn DownloadSink) -> io::Result<u64> {
        let body = {
            let mut state = self.lock();
            state.check("fetch")?;
            state.calls.push(Call::Fetch(url.to_string()));
            state
                .documents
                .get(url)
                .cloned()
                .ok_or_else(|| io::Error::from_raw_os_error(libc::ENOENT))?
        };
        for chunk in body.chunks(CHUNK_SIZE) {
            sink.write_chunk(chunk)?;
        }
        Ok(body.len() as u64)
    }
}
