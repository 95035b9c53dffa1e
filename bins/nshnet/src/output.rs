//! Text rendering of command results.

use std::io::{self, Write};

use nshnet::arp::ArpEntry;
use nshnet::device::{DeviceStatus, ProtocolStats};
use nshnet::nslookup::HostEntry;
use nshnet::util::format_mac;

/// Print one status block per device, each followed by a blank line.
pub fn print_status<W: Write>(w: &mut W, statuses: &[DeviceStatus]) -> io::Result<()> {
    for status in statuses {
        write!(w, "{}\tLink encap:Ethernet", status.name)?;
        if let Some(hwaddr) = &status.hwaddr {
            write!(w, " HWaddr {}", hwaddr)?;
        }
        write!(w, " at {}", if status.up { "UP" } else { "DOWN" })?;
        if let Some(mtu) = status.mtu {
            write!(w, " mtu {}", mtu)?;
        }
        writeln!(w)?;

        if let Some(addr) = status.ipv4 {
            write!(w, "\tinet addr:{}", addr)?;
            if let Some(mask) = status.netmask {
                write!(w, " Mask:{}", mask)?;
            }
            writeln!(w)?;
        }
        for (addr, prefix) in &status.ipv6 {
            writeln!(w, "\tinet6 addr: {}/{}", addr, prefix)?;
        }
        if let (Some(rx), Some(tx)) = (status.rx_bytes, status.tx_bytes) {
            writeln!(w, "\tRX bytes:{} TX bytes:{}", rx, tx)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Print protocol counters, one `name: value` pair per line.
pub fn print_statistics<W: Write>(w: &mut W, statistics: &[ProtocolStats]) -> io::Result<()> {
    for group in statistics {
        writeln!(w, "{}:", group.protocol)?;
        for (name, value) in &group.counters {
            writeln!(w, "\t{}: {}", name, value)?;
        }
    }
    Ok(())
}

/// Print the devices `ifup`/`ifdown` can be applied to.
pub fn print_choices<W: Write>(w: &mut W, names: &[String]) -> io::Result<()> {
    writeln!(w, "Please select ifname:")?;
    for name in names {
        writeln!(w, "\t{}", name)?;
    }
    Ok(())
}

pub fn print_switched<W: Write>(w: &mut W, command: &str, ifname: &str, ok: bool) -> io::Result<()> {
    writeln!(w, "{} {}...{}", command, ifname, if ok { "OK" } else { "Failed" })
}

/// Print ARP entries under a column header.
pub fn print_arp_table<W: Write>(w: &mut W, entries: &[ArpEntry]) -> io::Result<()> {
    writeln!(w, "{:<12} {:<17} {}", "IP Address", "Ethernet Address", "Interface")?;
    for entry in entries {
        writeln!(
            w,
            "{:<12} {:<17} {}",
            entry.ip.to_string(),
            format_mac(&entry.mac),
            entry.ifname
        )?;
    }
    Ok(())
}

pub fn print_hwaddr<W: Write>(w: &mut W, mac: &[u8; 6]) -> io::Result<()> {
    writeln!(w, "HWaddr: {}", format_mac(mac))
}

pub fn print_hosts<W: Write>(w: &mut W, entries: &[HostEntry]) -> io::Result<()> {
    for entry in entries {
        writeln!(w, "Host: {} Addr: {}", entry.name, entry.addr)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_arp_table_columns() {
        let entries = vec![ArpEntry::new(
            Ipv4Addr::new(10, 0, 0, 7),
            [0x02, 0, 0, 0xaa, 0xbb, 0xcc],
            "eth0",
        )];
        let text = render(|w| print_arp_table(w, &entries));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "IP Address   Ethernet Address  Interface");
        assert_eq!(lines[1], "10.0.0.7     02:00:00:aa:bb:cc eth0");
    }

    #[test]
    fn test_hwaddr() {
        let text = render(|w| print_hwaddr(w, &[0, 0xe0, 0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(text, "HWaddr: 00:e0:de:ad:be:ef\n");
    }

    #[test]
    fn test_hosts() {
        let entries = vec![HostEntry::new("localhost", IpAddr::V4(Ipv4Addr::LOCALHOST))];
        let text = render(|w| print_hosts(w, &entries));
        assert_eq!(text, "Host: localhost Addr: 127.0.0.1\n");
    }

    #[test]
    fn test_switched() {
        assert_eq!(render(|w| print_switched(w, "ifup", "eth0", true)), "ifup eth0...OK\n");
        assert_eq!(
            render(|w| print_switched(w, "ifdown", "eth0", false)),
            "ifdown eth0...Failed\n"
        );
    }

    #[test]
    fn test_status_block() {
        let mut status = DeviceStatus::new("eth0");
        status.up = true;
        status.mtu = Some(1500);
        status.hwaddr = Some("02:00:00:00:00:01".into());
        status.ipv4 = Some(Ipv4Addr::new(10, 0, 0, 5));
        status.netmask = Some(Ipv4Addr::new(255, 255, 255, 0));

        let text = render(|w| print_status(w, &[status]));
        assert_eq!(
            text,
            "eth0\tLink encap:Ethernet HWaddr 02:00:00:00:00:01 at UP mtu 1500\n\
             \tinet addr:10.0.0.5 Mask:255.255.255.0\n\n"
        );
    }

    #[test]
    fn test_statistics() {
        let stats = vec![
            ProtocolStats::new("Ip")
                .counter("InReceives", 1200)
                .counter("OutRequests", 800),
            ProtocolStats::new("Tcp").counter("MaxConn", -1),
        ];
        let text = render(|w| print_statistics(w, &stats));
        assert_eq!(
            text,
            "Ip:\n\tInReceives: 1200\n\tOutRequests: 800\nTcp:\n\tMaxConn: -1\n"
        );
        assert_eq!(render(|w| print_statistics(w, &[])), "");
    }

    #[test]
    fn test_choices() {
        let text = render(|w| print_choices(w, &["eth0".to_string(), "lo".to_string()]));
        assert_eq!(text, "Please select ifname:\n\teth0\n\tlo\n");
    }
}
