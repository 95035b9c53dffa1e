//! Parsing and lookup helpers shared by the commands.

pub mod addr;
pub mod ifname;

pub use addr::{AddrError, HwAddr, format_mac, parse_hwaddr};
pub use ifname::IfError;
