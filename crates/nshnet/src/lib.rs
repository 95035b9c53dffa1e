//! Network administration commands for a small shell.
//!
//! Each command is a driver over collaborator traits from [`backend`]:
//!
//! - [`ifconfig`] - classify, resolve and apply interface configuration
//! - [`device`] - device enumeration and `ifup`/`ifdown`
//! - [`arp`] - list, query, add and delete ARP mappings
//! - [`transfer`] - `get`/`put` over TFTP and `wget`
//! - [`nslookup`] - host name lookup
//!
//! The drivers run unchanged against the Linux backend ([`netlink`],
//! [`sysfs`], [`system`]) or the in-memory [`backend::MemoryStack`].
//!
//! # Example
//!
//! ```ignore
//! use nshnet::backend::MemoryStack;
//! use nshnet::caps::Capabilities;
//!
//! let stack = MemoryStack::default();
//! stack.add_device("eth0");
//!
//! let tokens = ["ifconfig", "eth0", "10.0.0.5/24"];
//! nshnet::ifconfig::run(&tokens, &Capabilities::default(), &stack, &stack).await?;
//! ```

pub mod arp;
pub mod backend;
pub mod caps;
pub mod config;
pub mod device;
pub mod error;
pub mod ifconfig;
pub mod netlink;
pub mod nslookup;
pub mod sysfs;
pub mod system;
pub mod transfer;
pub mod util;

pub use caps::Capabilities;
pub use config::Settings;
pub use error::{Error, ErrorKind, Result};
