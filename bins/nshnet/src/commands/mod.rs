//! Subcommand implementations.

pub mod arp;
pub mod ifconfig;
pub mod link;
pub mod nslookup;
pub mod transfer;

use std::path::PathBuf;

use nshnet::Settings;

/// Settings plus the collaborators a command runs against.
pub struct Context<'a, D, L, R, T, W> {
    pub settings: &'a Settings,
    /// Device configuration and the ARP table.
    pub config: &'a D,
    pub lister: &'a L,
    pub resolver: &'a R,
    pub transfer: &'a T,
    pub web: &'a W,
}

/// Directory relative local paths are resolved against.
pub fn cwd() -> anyhow::Result<PathBuf> {
    Ok(std::env::current_dir()?)
}
