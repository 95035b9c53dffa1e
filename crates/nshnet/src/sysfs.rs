//! Device listing over `/sys/class/net`, with protocol counters from
//! `/proc/net/snmp`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::backend::{DeviceLister, ListedEntry};
use crate::device::{DeviceStatus, ProtocolStats};
use crate::netlink::types::iff;
use crate::util::ifname;

/// Lists the device directories under a sysfs class root.
#[derive(Debug, Clone)]
pub struct SysfsLister {
    root: PathBuf,
    snmp: Option<PathBuf>,
}

impl SysfsLister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            snmp: None,
        }
    }

    /// Report the protocol counters found in `path`.
    pub fn with_statistics(mut self, path: impl Into<PathBuf>) -> Self {
        self.snmp = Some(path.into());
        self
    }

    fn read(&self, name: &str, attr: &str) -> io::Result<String> {
        fs::read_to_string(self.root.join(name).join(attr)).map(|s| s.trim().to_string())
    }

    fn read_u64(&self, name: &str, attr: &str) -> Option<u64> {
        self.read(name, attr).ok()?.parse().ok()
    }
}

/// Parse a sysfs `flags` value such as `0x1003`.
fn parse_flags(text: &str) -> Option<u32> {
    u32::from_str_radix(text.trim_start_matches("0x"), 16).ok()
}

/// Parse the `/proc/net/snmp` layout: per protocol, a line of counter
/// names followed by a line of values, both prefixed with `Proto:`.
fn parse_snmp(text: &str) -> io::Result<Vec<ProtocolStats>> {
    let invalid = |line: &str| {
        io::Error::new(io::ErrorKind::InvalidData, format!("malformed snmp line: {}", line))
    };

    let mut stats = Vec::new();
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    while let Some(header) = lines.next() {
        let (protocol, names) = header.split_once(':').ok_or_else(|| invalid(header))?;
        let values_line = lines.next().ok_or_else(|| invalid(header))?;
        let (again, values) = values_line
            .split_once(':')
            .ok_or_else(|| invalid(values_line))?;
        if again != protocol {
            return Err(invalid(values_line));
        }

        let names: Vec<&str> = names.split_whitespace().collect();
        let values: Vec<&str> = values.split_whitespace().collect();
        if names.len() != values.len() {
            return Err(invalid(values_line));
        }

        let mut group = ProtocolStats::new(protocol);
        for (name, value) in names.into_iter().zip(values) {
            let value = value.parse().map_err(|_| invalid(values_line))?;
            group = group.counter(name, value);
        }
        stats.push(group);
    }
    Ok(stats)
}

impl DeviceLister for SysfsLister {
    type Entries = Box<dyn Iterator<Item = io::Result<ListedEntry>>>;

    fn open(&self) -> io::Result<Self::Entries> {
        let dir = fs::read_dir(&self.root)?;
        Ok(Box::new(dir.map(|entry| {
            let entry = entry?;
            let kind = entry.file_type()?;
            Ok(ListedEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                regular: kind.is_dir() || kind.is_symlink(),
            })
        })))
    }

    fn location(&self) -> &Path {
        &self.root
    }

    fn status(&self, name: &str) -> io::Result<DeviceStatus> {
        ifname::validate(name)?;
        let flags = self.read(name, "flags")?;

        let hwaddr = self
            .read(name, "address")
            .ok()
            .filter(|a| !a.is_empty() && a.chars().any(|c| c != '0' && c != ':'));

        Ok(DeviceStatus {
            name: name.to_string(),
            up: parse_flags(&flags).is_some_and(|f| f & iff::UP != 0),
            mtu: self
                .read_u64(name, "mtu")
                .and_then(|m| u32::try_from(m).ok()),
            hwaddr,
            rx_bytes: self.read_u64(name, "statistics/rx_bytes"),
            tx_bytes: self.read_u64(name, "statistics/tx_bytes"),
            ..Default::default()
        })
    }

    fn statistics(&self) -> io::Result<Vec<ProtocolStats>> {
        match &self.snmp {
            Some(path) => parse_snmp(&fs::read_to_string(path)?),
            None => Ok(Vec::new()),
        }
    }
}
