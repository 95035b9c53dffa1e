//! Ordered application of a resolved interface configuration.
//!
//! Steps run in a fixed order and stop at the first failure. Earlier
//! steps stay applied; nothing is rolled back or retried.

use std::io;
use std::net::IpAddr;

use tracing::debug;

use super::COMMAND;
use super::classify::AddressAction;
use super::resolve::{InterfaceConfig, Ipv4Config, Ipv6Config, ResolvedAddressSet};
use crate::backend::DeviceConfig;
use crate::error::{Error, Result};

fn step(operation: &'static str) -> impl FnOnce(io::Error) -> Error {
    move |e| Error::failed(COMMAND, operation, &e)
}

/// Push `iface` through `config`.
///
/// A request carrying an MTU stops after the MTU is set.
pub async fn apply<D: DeviceConfig>(config: &D, iface: &InterfaceConfig<'_>) -> Result<()> {
    let ifname = iface.ifname;

    if let Some(hwaddr) = &iface.hwaddr {
        debug!(ifname, %hwaddr, "set hwaddr");
        config
            .set_hwaddr(ifname, hwaddr)
            .await
            .map_err(step("set_hwaddr"))?;
    }

    if let Some(mtu) = iface.mtu {
        debug!(ifname, mtu, "set mtu");
        return config.set_mtu(ifname, mtu).await.map_err(step("set_mtu"));
    }

    let dns = match &iface.addresses {
        ResolvedAddressSet::Dhcp => {
            debug!(ifname, "obtain address via dhcp");
            return config
                .obtain_ipv4_addr(ifname)
                .await
                .map_err(step("obtain_ipv4_addr"));
        }
        ResolvedAddressSet::Ipv4(v4) => {
            apply_ipv4(config, ifname, v4).await?;
            v4.dns.map(IpAddr::V4)
        }
        ResolvedAddressSet::Ipv6(v6) => {
            apply_ipv6(config, ifname, v6).await?;
            v6.dns.map(IpAddr::V6)
        }
    };

    if let Some(server) = dns {
        set_dns(config, server).await?;
    }
    Ok(())
}

async fn apply_ipv4<D: DeviceConfig>(config: &D, ifname: &str, v4: &Ipv4Config) -> Result<()> {
    if let Some(host) = v4.host {
        debug!(ifname, %host, "set ipv4 address");
        config
            .set_ipv4_addr(ifname, host)
            .await
            .map_err(step("set_ipv4_addr"))?;
    }

    debug!(ifname, netmask = %v4.netmask, "set ipv4 netmask");
    config
        .set_ipv4_netmask(ifname, v4.netmask)
        .await
        .map_err(step("set_ipv4_netmask"))?;

    if let Some(gateway) = v4.gateway {
        debug!(ifname, %gateway, "set ipv4 gateway");
        config
            .set_ipv4_gateway(ifname, gateway)
            .await
            .map_err(step("set_ipv4_gateway"))?;
    }
    Ok(())
}

async fn apply_ipv6<D: DeviceConfig>(config: &D, ifname: &str, v6: &Ipv6Config) -> Result<()> {
    match v6.multi {
        Some(action) => {
            if let Some(host) = v6.host {
                debug!(ifname, %host, prefix_len = v6.prefix_len, ?action, "update ipv6 address");
                match action {
                    AddressAction::Add => config
                        .add_ipv6_addr(ifname, host, v6.prefix_len)
                        .await
                        .map_err(step("add_ipv6_addr"))?,
                    AddressAction::Delete => config
                        .del_ipv6_addr(ifname, host, v6.prefix_len)
                        .await
                        .map_err(step("del_ipv6_addr"))?,
                }
            }
        }
        None => {
            if let Some(host) = v6.host {
                debug!(ifname, %host, "set ipv6 address");
                config
                    .set_ipv6_addr(ifname, host)
                    .await
                    .map_err(step("set_ipv6_addr"))?;
            }
            debug!(ifname, netmask = %v6.netmask, "set ipv6 netmask");
            config
                .set_ipv6_netmask(ifname, v6.netmask)
                .await
                .map_err(step("set_ipv6_netmask"))?;
        }
    }

    if let Some(gateway) = v6.gateway {
        debug!(ifname, %gateway, "set ipv6 gateway");
        config
            .set_ipv6_gateway(ifname, gateway)
            .await
            .map_err(step("set_ipv6_gateway"))?;
    }
    Ok(())
}

async fn set_dns<D: DeviceConfig>(config: &D, server: IpAddr) -> Result<()> {
    debug!(%server, "set dns");
    config.set_dns(server).await.map_err(step("set_dns"))
}
