//! ARP table management: `arp [-i ifname] [-a|-d|-s] [addr] [hwaddr]`.

use std::io;
use std::net::Ipv4Addr;

use tracing::debug;

use crate::backend::ArpTable;
use crate::error::{Error, Result};
use crate::util::addr::{parse_ipv4, parse_mac};

const COMMAND: &str = "arp";

/// One protocol-to-hardware address mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpEntry {
    pub ip: Ipv4Addr,
    pub mac: [u8; 6],
    /// Owning interface.
    pub ifname: String,
}

impl ArpEntry {
    pub fn new(ip: Ipv4Addr, mac: [u8; 6], ifname: impl Into<String>) -> Self {
        Self {
            ip,
            mac,
            ifname: ifname.into(),
        }
    }
}

/// Flag selecting the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArpFlag {
    #[default]
    None,
    /// `-a`
    Get,
    /// `-d`
    Delete,
    /// `-s`
    Set,
}

/// Resolved operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArpOp {
    List,
    Get(Ipv4Addr),
    Delete(Ipv4Addr),
    Set(Ipv4Addr, [u8; 6]),
}

/// Result of an ARP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArpOutcome {
    Listing(Vec<ArpEntry>),
    Mapping([u8; 6]),
    Deleted,
    Set,
}

/// Pick the operation from the flag and operands.
///
/// `-a` with no operand lists the table, BSD style.
pub fn parse_op<S: AsRef<str>>(flag: ArpFlag, operands: &[S]) -> Result<ArpOp> {
    let operands: Vec<&str> = operands.iter().map(|s| s.as_ref()).collect();

    match flag {
        ArpFlag::None if operands.is_empty() => Ok(ArpOp::List),
        ArpFlag::None => Err(Error::TooManyArguments { command: COMMAND }),
        ArpFlag::Get if operands.is_empty() => Ok(ArpOp::List),
        ArpFlag::Get => {
            expect_operands(&operands, 1)?;
            Ok(ArpOp::Get(ip_operand(operands[0])?))
        }
        ArpFlag::Delete => {
            expect_operands(&operands, 1)?;
            Ok(ArpOp::Delete(ip_operand(operands[0])?))
        }
        ArpFlag::Set => {
            expect_operands(&operands, 2)?;
            let ip = ip_operand(operands[0])?;
            let mac =
                parse_mac(operands[1]).map_err(|_| Error::invalid(COMMAND, operands[1]))?;
            Ok(ArpOp::Set(ip, mac))
        }
    }
}

/// Any count mismatch for `-a`/`-d`/`-s` is a missing argument.
fn expect_operands(operands: &[&str], wanted: usize) -> Result<()> {
    if operands.len() != wanted {
        return Err(Error::missing(COMMAND));
    }
    Ok(())
}

fn ip_operand(s: &str) -> Result<Ipv4Addr> {
    parse_ipv4(s).map_err(|_| Error::invalid(COMMAND, s))
}

/// Map a table error for `ip` onto the command error taxonomy.
fn table_error(err: io::Error, ip: Ipv4Addr) -> Error {
    match err.raw_os_error() {
        Some(libc::ENOENT) | Some(libc::ENETUNREACH) => Error::NoSuchEntry {
            command: COMMAND,
            what: "ARP entry",
            key: ip.to_string(),
        },
        _ => Error::failed(COMMAND, "ioctl", &err),
    }
}

/// Read up to `capacity` entries, keeping those on `ifname` when given.
pub async fn list<T: ArpTable>(
    table: &T,
    capacity: usize,
    ifname: Option<&str>,
) -> Result<Vec<ArpEntry>> {
    let mut snapshot = Vec::new();
    snapshot
        .try_reserve_exact(capacity)
        .map_err(|_| Error::OutOfMemory { command: COMMAND })?;

    table
        .dump(&mut snapshot, capacity)
        .await
        .map_err(|e| Error::failed(COMMAND, "arptable", &e))?;
    snapshot.truncate(capacity);

    if let Some(ifname) = ifname {
        snapshot.retain(|entry| entry.ifname == ifname);
    }
    debug!(entries = snapshot.len(), ?ifname, "arp table read");
    Ok(snapshot)
}

/// Execute one ARP operation.
pub async fn execute<T: ArpTable>(
    table: &T,
    capacity: usize,
    op: ArpOp,
    ifname: Option<&str>,
) -> Result<ArpOutcome> {
    match op {
        ArpOp::List => list(table, capacity, ifname).await.map(ArpOutcome::Listing),
        ArpOp::Get(ip) => table
            .get(ip, ifname)
            .await
            .map(ArpOutcome::Mapping)
            .map_err(|e| table_error(e, ip)),
        ArpOp::Delete(ip) => table
            .delete(ip, ifname)
            .await
            .map(|()| ArpOutcome::Deleted)
            .map_err(|e| table_error(e, ip)),
        ArpOp::Set(ip, mac) => table
            .set(ip, mac, ifname)
            .await
            .map(|()| ArpOutcome::Set)
            .map_err(|e| table_error(e, ip)),
    }
}

/// Parse and execute an ARP command.
pub async fn run<T: ArpTable, S: AsRef<str>>(
    table: &T,
    capacity: usize,
    flag: ArpFlag,
    ifname: Option<&str>,
    operands: &[S],
) -> Result<ArpOutcome> {
    let op = parse_op(flag, operands)?;
    debug!(?op, ?ifname, "arp");
    execute(table, capacity, op, ifname).await
}
