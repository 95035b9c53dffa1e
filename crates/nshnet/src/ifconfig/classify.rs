//! Token classification for `ifconfig <dev> [options...]`.
//!
//! A single left-to-right scan assigns each token a role. Keywords that
//! take a value consume the following token; the first unclaimed token
//! in the first four positions is the host address.

use tracing::debug;

use crate::caps::Capabilities;
use crate::error::{Error, Result};
use crate::util::HwAddr;
use crate::util::addr::parse_hwaddr;

use super::COMMAND;

/// Smallest MTU accepted on a link.
pub const MIN_LINK_MTU: u32 = 1280;

/// Last token position that may hold the host address.
const HOST_POSITION_LIMIT: usize = 4;

/// Family requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FamilySelector {
    /// No `inet`/`inet6` flag.
    #[default]
    Unspecified,
    Ipv4,
    Ipv6,
}

/// `add`/`del` for devices holding several IPv6 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressAction {
    Add,
    Delete,
}

/// Classified `ifconfig` tokens.
///
/// Address-like values stay textual; [`super::resolve`] converts them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedConfigRequest<'a> {
    pub ifname: &'a str,
    pub family: FamilySelector,
    pub host: Option<&'a str>,
    pub netmask: Option<&'a str>,
    pub prefixlen: Option<&'a str>,
    pub gateway: Option<&'a str>,
    pub dns: Option<&'a str>,
    pub hwaddr: Option<HwAddr>,
    /// Clamped to [`MIN_LINK_MTU`].
    pub mtu: Option<u32>,
    pub action: Option<AddressAction>,
}

/// Problems found during the scan, reported once it completes.
#[derive(Default)]
struct Findings {
    missing: Option<String>,
    invalid: Option<String>,
}

impl Findings {
    fn missing(&mut self, option: &str) {
        self.missing.get_or_insert_with(|| option.to_string());
    }

    fn invalid(&mut self, token: &str) {
        self.invalid.get_or_insert_with(|| token.to_string());
    }
}

/// Classify `tokens`, where token 0 is the command and token 1 the device.
pub fn classify<'a, S: AsRef<str>>(
    tokens: &'a [S],
    caps: &Capabilities,
) -> Result<ParsedConfigRequest<'a>> {
    let Some(ifname) = tokens.get(1).map(|s| s.as_ref()) else {
        return Err(Error::missing(COMMAND));
    };

    let mut request = ParsedConfigRequest {
        ifname,
        ..Default::default()
    };
    let mut findings = Findings::default();

    let mut i = 2;
    while i < tokens.len() {
        let token = tokens[i].as_ref();
        let value = tokens.get(i + 1).map(|s| s.as_ref());

        match token {
            "gw" | "gateway" | "dr" | "netmask" | "prefixlen" | "hw" | "dns" | "mtu" => {
                let Some(value) = value else {
                    findings.missing(token);
                    break;
                };
                i += 1;
                take_value(token, value, caps, &mut request, &mut findings);
            }
            "inet" if caps.ipv4 => request.family = FamilySelector::Ipv4,
            "inet6" if caps.ipv6 => request.family = FamilySelector::Ipv6,
            "add" if caps.multi_ipv6 => request.action = Some(AddressAction::Add),
            "del" if caps.multi_ipv6 => request.action = Some(AddressAction::Delete),
            "inet" | "inet6" | "add" | "del" => findings.invalid(token),
            _ if request.host.is_none() && i <= HOST_POSITION_LIMIT => request.host = Some(token),
            _ => findings.invalid(token),
        }
        i += 1;
    }

    if let Some(option) = findings.missing {
        return Err(Error::missing_option(COMMAND, option));
    }
    if let Some(token) = findings.invalid {
        return Err(Error::invalid(COMMAND, token));
    }

    debug!(?request, "classified");
    Ok(request)
}

fn take_value<'a>(
    keyword: &str,
    value: &'a str,
    caps: &Capabilities,
    request: &mut ParsedConfigRequest<'a>,
    findings: &mut Findings,
) {
    match keyword {
        "gw" | "gateway" | "dr" => request.gateway = Some(value),
        "netmask" => request.netmask = Some(value),
        "prefixlen" if caps.ipv6 => request.prefixlen = Some(value),
        "dns" if caps.dns => request.dns = Some(value),
        "hw" if caps.link.has_hwaddr() => match parse_hwaddr(value, caps.link) {
            Ok(hw) => request.hwaddr = Some(hw),
            Err(_) => findings.invalid(value),
        },
        "mtu" => match value.parse::<u32>() {
            Ok(mtu) => request.mtu = Some(mtu.max(MIN_LINK_MTU)),
            Err(_) => findings.invalid(value),
        },
        _ => findings.invalid(keyword),
    }
}
