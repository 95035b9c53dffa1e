//! Settings file.
//!
//! Every field has a default so an empty document (or no file at all)
//! yields a usable configuration.
//!
//! ```yaml
//! capabilities:
//!   ipv6: true
//!   multi_ipv6: false
//!   link: ethernet
//! arp_table_size: 16
//! sysfs_root: /sys/class/net
//! net_stat: /proc/net/snmp
//! resolv_conf: /etc/resolv.conf
//! dhcp_client: [udhcpc, -n, -q, -i]
//! tftp_client: tftp
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::caps::Capabilities;

/// Default ARP table capacity.
pub const DEFAULT_ARP_TABLE_SIZE: usize = 16;

/// Errors loading the settings file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Command layer settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub capabilities: Capabilities,
    /// Number of entries an ARP listing reads at most.
    pub arp_table_size: usize,
    /// Directory listing the registered network devices.
    pub sysfs_root: PathBuf,
    /// Protocol counters shown after a full `ifconfig` listing.
    pub net_stat: PathBuf,
    /// File receiving the DNS server address.
    pub resolv_conf: PathBuf,
    /// DHCP client command line; the interface name is appended.
    pub dhcp_client: Vec<String>,
    /// TFTP client program.
    pub tftp_client: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            arp_table_size: DEFAULT_ARP_TABLE_SIZE,
            sysfs_root: PathBuf::from("/sys/class/net"),
            net_stat: PathBuf::from("/proc/net/snmp"),
            resolv_conf: PathBuf::from("/etc/resolv.conf"),
            dhcp_client: ["udhcpc", "-n", "-q", "-i"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            tftp_client: "tftp".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.arp_table_size == 0 {
            return Err(ConfigError::Invalid("arp_table_size must be non-zero".into()));
        }
        if self.dhcp_client.is_empty() {
            return Err(ConfigError::Invalid("dhcp_client must name a program".into()));
        }
        if self.capabilities.multi_ipv6 && !self.capabilities.ipv6 {
            return Err(ConfigError::Invalid(
                "multi_ipv6 requires ipv6 support".into(),
            ));
        }
        Ok(())
    }
}
