//! Common test utilities for integration tests.

use nshnet::Capabilities;
use nshnet::backend::MemoryStack;
use nshnet::ifconfig::{self, IfconfigOutcome};

/// A memory stack with `eth0` and `eth1` registered.
pub fn stack() -> MemoryStack {
    let stack = MemoryStack::new(nshnet::config::DEFAULT_ARP_TABLE_SIZE);
    stack.add_device("eth0");
    stack.add_device("eth1");
    stack
}

/// Run one `ifconfig` command line against `stack`.
pub async fn ifconfig(
    stack: &MemoryStack,
    caps: &Capabilities,
    line: &str,
) -> nshnet::Result<IfconfigOutcome> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    ifconfig::run(&tokens, caps, stack, stack).await
}
