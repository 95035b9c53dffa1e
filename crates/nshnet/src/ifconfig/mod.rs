//! `ifconfig [<dev>] [options...]`
//!
//! ```text
//! ifconfig [nic_name [address_family] [[add|del] <ip-address>|dhcp]]
//!          [hw <hw-address>] [dr|gw|gateway <dr-address>]
//!          [netmask <net-mask>|prefixlen <len>] [dns <dns-address>]
//!          [mtu <len>]
//! ```
//!
//! With no device every device's status is shown, followed by the global
//! protocol counters; with only a device, that device's status. Otherwise the tokens go through
//! [`classify`], [`resolve`] and [`apply`] in turn.

pub mod apply;
pub mod classify;
pub mod resolve;

pub use apply::apply;
pub use classify::{AddressAction, FamilySelector, MIN_LINK_MTU, ParsedConfigRequest, classify};
pub use resolve::{InterfaceConfig, Ipv4Config, Ipv6Config, ResolvedAddressSet, resolve};

use crate::backend::{DeviceConfig, DeviceLister};
use crate::caps::Capabilities;
use crate::device::{self, DeviceStatus, ProtocolStats};
use crate::error::Result;

pub(crate) const COMMAND: &str = "ifconfig";

/// What an `ifconfig` invocation produced.
#[derive(Debug)]
pub enum IfconfigOutcome {
    Status {
        devices: Vec<DeviceStatus>,
        /// Only filled for a full listing.
        statistics: Vec<ProtocolStats>,
    },
    Configured,
}

/// Run `ifconfig` over the full token list, command name included.
pub async fn run<D, L, S>(
    tokens: &[S],
    caps: &Capabilities,
    config: &D,
    lister: &L,
) -> Result<IfconfigOutcome>
where
    D: DeviceConfig,
    L: DeviceLister,
    S: AsRef<str>,
{
    match tokens {
        [] | [_] => {
            let devices = device::all_status(lister, COMMAND)?;
            let statistics = device::statistics(lister, COMMAND);
            Ok(IfconfigOutcome::Status {
                devices,
                statistics,
            })
        }
        [_, ifname] => device::device_status(lister, COMMAND, ifname.as_ref()).map(|status| {
            IfconfigOutcome::Status {
                devices: vec![status],
                statistics: Vec::new(),
            }
        }),
        _ => {
            let request = classify(tokens, caps)?;
            let iface = resolve(&request, caps)?;
            apply(config, &iface).await?;
            Ok(IfconfigOutcome::Configured)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Call, MemoryStack};
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_status_of_all_devices() {
        let stack = MemoryStack::new(4);
        stack.add_device("eth0");
        stack.add_device("lo");
        stack.set_statistics(vec![ProtocolStats::new("Udp").counter("InDatagrams", 7)]);

        let outcome = run(&["ifconfig"], &Capabilities::default(), &stack, &stack)
            .await
            .unwrap();
        let IfconfigOutcome::Status {
            devices,
            statistics,
        } = outcome
        else {
            panic!("expected status");
        };
        assert_eq!(devices.len(), 2);
        assert_eq!(statistics[0].protocol, "Udp");
        assert_eq!(statistics[0].counters, vec![("InDatagrams".to_string(), 7)]);
    }

    #[tokio::test]
    async fn test_unreadable_statistics_are_omitted() {
        let stack = MemoryStack::new(4);
        stack.add_device("eth0");
        stack.set_statistics(vec![ProtocolStats::new("Ip")]);
        stack.fail_on("statistics", libc::ENOENT);

        let outcome = run(&["ifconfig"], &Capabilities::default(), &stack, &stack)
            .await
            .unwrap();
        let IfconfigOutcome::Status {
            devices,
            statistics,
        } = outcome
        else {
            panic!("expected status");
        };
        assert_eq!(devices.len(), 1);
        assert!(statistics.is_empty());
    }

    #[tokio::test]
    async fn test_status_of_one_device() {
        let stack = MemoryStack::new(4);
        stack.add_device("eth0");

        stack.set_statistics(vec![ProtocolStats::new("Ip")]);

        let outcome = run(&["ifconfig", "eth0"], &Capabilities::default(), &stack, &stack)
            .await
            .unwrap();
        let IfconfigOutcome::Status {
            devices: statuses,
            statistics,
        } = outcome
        else {
            panic!("expected status");
        };
        assert!(statistics.is_empty());
        assert_eq!(statuses[0].name, "eth0");
        assert_eq!(statuses[0].mtu, Some(1500));

        let err = run(&["ifconfig", "eth7"], &Capabilities::default(), &stack, &stack)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "ifconfig: no such device: eth7");
    }

    #[tokio::test]
    async fn test_classification_error_makes_no_calls() {
        let stack = MemoryStack::new(4);
        stack.add_device("eth0");

        let tokens = ["ifconfig", "eth0", "hw", "zz", "mtu"];
        let err = run(&tokens, &Capabilities::default(), &stack, &stack)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingArgument);
        assert!(stack.calls().is_empty());
    }

    #[tokio::test]
    async fn test_configure() {
        let stack = MemoryStack::new(4);
        stack.add_device("eth0");

        let tokens = ["ifconfig", "eth0", "mtu", "9000"];
        let outcome = run(&tokens, &Capabilities::default(), &stack, &stack)
            .await
            .unwrap();
        assert!(matches!(outcome, IfconfigOutcome::Configured));
        assert_eq!(stack.calls(), vec![Call::SetMtu("eth0".into(), 9000)]);
    }
}
