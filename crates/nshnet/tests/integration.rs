//! Integration test entry point.
//!
//! The command drivers run against the in-memory stack, so these tests
//! need no privileges:
//!
//! ```bash
//! cargo test -p nshnet --test integration
//! cargo test -p nshnet --test integration arp
//! ```
//!
//! # Test Organization
//!
//! - `ifconfig.rs` - classification, resolution and call sequences
//! - `device.rs` - enumeration, status and `ifup`/`ifdown`
//! - `arp.rs` - ARP table operations
//! - `transfer.rs` - `get`/`put`/`wget` and `nslookup`

#[path = "common/mod.rs"]
mod common;

#[path = "integration/ifconfig.rs"]
mod ifconfig;

#[path = "integration/device.rs"]
mod device;

#[path = "integration/arp.rs"]
mod arp;

#[path = "integration/transfer.rs"]
mod transfer;
