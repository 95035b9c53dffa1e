//! Device enumeration and the `ifup`/`ifdown` drivers.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::ops::ControlFlow;

use tracing::{debug, warn};

use crate::backend::{DeviceConfig, DeviceLister};
use crate::error::{Error, Result};

/// Status of one network device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceStatus {
    pub name: String,
    pub up: bool,
    pub mtu: Option<u32>,
    /// Hardware address as text.
    pub hwaddr: Option<String>,
    pub ipv4: Option<Ipv4Addr>,
    pub netmask: Option<Ipv4Addr>,
    pub ipv6: Vec<(Ipv6Addr, u8)>,
    pub rx_bytes: Option<u64>,
    pub tx_bytes: Option<u64>,
}

impl DeviceStatus {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Counters of one protocol, in the order the stack reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolStats {
    pub protocol: String,
    pub counters: Vec<(String, i64)>,
}

impl ProtocolStats {
    pub fn new(protocol: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            counters: Vec::new(),
        }
    }

    /// Add a counter.
    pub fn counter(mut self, name: impl Into<String>, value: i64) -> Self {
        self.counters.push((name.into(), value));
        self
    }
}

/// Lazy iterator over registered device names.
///
/// Entries that are not regular device entries, or whose status cannot be
/// queried, are skipped. Obtain a new iterator from [`devices`] to restart.
pub struct Devices<'a, L: DeviceLister> {
    lister: &'a L,
    entries: L::Entries,
}

impl<L: DeviceLister> Iterator for Devices<'_, L> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable device entry");
                    continue;
                }
            };
            if !entry.regular {
                continue;
            }
            if !self.lister.is_device(&entry.name) {
                debug!(name = %entry.name, "skipping entry without status");
                continue;
            }
            return Some(entry.name);
        }
    }
}

/// Open the device listing.
pub fn devices<'a, L: DeviceLister>(lister: &'a L, command: &'static str) -> Result<Devices<'a, L>> {
    let entries = lister.open().map_err(|e| Error::EnumerationFailed {
        command,
        path: lister.location().to_path_buf(),
        errno: e.raw_os_error().unwrap_or(libc::EIO),
    })?;
    Ok(Devices { lister, entries })
}

/// Visit every device until `visitor` breaks.
///
/// Returns the first `Break`, or `Continue` once every device was visited.
pub fn for_each_device<L, B, F>(
    lister: &L,
    command: &'static str,
    mut visitor: F,
) -> Result<ControlFlow<B>>
where
    L: DeviceLister,
    F: FnMut(&str) -> ControlFlow<B>,
{
    for name in devices(lister, command)? {
        if let ControlFlow::Break(value) = visitor(&name) {
            return Ok(ControlFlow::Break(value));
        }
    }
    Ok(ControlFlow::Continue(()))
}

/// Status of every device, in listing order.
pub fn all_status<L: DeviceLister>(lister: &L, command: &'static str) -> Result<Vec<DeviceStatus>> {
    let mut statuses = Vec::new();
    let _ = for_each_device(lister, command, |name| match lister.status(name) {
        Ok(status) => {
            statuses.push(status);
            ControlFlow::<()>::Continue(())
        }
        Err(e) => {
            warn!(device = name, error = %e, "device vanished during listing");
            ControlFlow::Continue(())
        }
    })?;
    Ok(statuses)
}

/// Global protocol statistics shown after a full listing.
///
/// Unreadable statistics are logged and left out; the listing still succeeds.
pub fn statistics<L: DeviceLister>(lister: &L, command: &'static str) -> Vec<ProtocolStats> {
    match lister.statistics() {
        Ok(stats) => stats,
        Err(e) => {
            warn!(command, error = %e, "network statistics unavailable");
            Vec::new()
        }
    }
}

/// Status of one named device.
pub fn device_status<L: DeviceLister>(
    lister: &L,
    command: &'static str,
    ifname: &str,
) -> Result<DeviceStatus> {
    lister.status(ifname).map_err(|_| Error::NoSuchEntry {
        command,
        what: "device",
        key: ifname.to_string(),
    })
}

/// Result of `ifup`/`ifdown`.
#[derive(Debug)]
pub enum LinkOutcome {
    /// No device named; these are the candidates.
    Choices(Vec<String>),
    /// The device was switched, or the switch failed with `failure`.
    Switched {
        ifname: String,
        failure: Option<Error>,
    },
}

/// Bring a device up or down.
///
/// Exactly one device name is expected; otherwise the available devices
/// are returned for the user to pick from.
pub async fn set_link<D, L, S>(
    config: &D,
    lister: &L,
    command: &'static str,
    operands: &[S],
    up: bool,
) -> Result<LinkOutcome>
where
    D: DeviceConfig,
    L: DeviceLister,
    S: AsRef<str>,
{
    let [ifname] = operands else {
        let names = devices(lister, command)?.collect();
        return Ok(LinkOutcome::Choices(names));
    };
    let ifname = ifname.as_ref();

    debug!(ifname, up, "set link state");
    let failure = config
        .set_link_up(ifname, up)
        .await
        .err()
        .map(|e| Error::failed(command, if up { "ifup" } else { "ifdown" }, &e));

    Ok(LinkOutcome::Switched {
        ifname: ifname.to_string(),
        failure,
    })
}
