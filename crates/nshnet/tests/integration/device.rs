//! Device enumeration and link switching.

use std::ops::ControlFlow;

use nshnet::Capabilities;
use nshnet::ErrorKind;
use nshnet::backend::{Call, MemoryStack};
use nshnet::device::{self, LinkOutcome};
use nshnet::ifconfig::IfconfigOutcome;

use crate::common::{ifconfig, stack};

#[test]
fn test_enumeration_restarts_and_stops_early() {
    let stack = stack();
    stack.add_listing_entry("bonding_masters", false);

    let names: Vec<String> = device::devices(&stack, "ifconfig").unwrap().collect();
    assert_eq!(names, vec!["eth0", "eth1"]);

    let first = device::devices(&stack, "ifconfig").unwrap().next();
    assert_eq!(first.as_deref(), Some("eth0"));

    let mut seen = Vec::new();
    let flow = device::for_each_device(&stack, "ifconfig", |name| {
        seen.push(name.to_string());
        ControlFlow::Break(name.to_string())
    })
    .unwrap();
    assert_eq!(flow, ControlFlow::Break("eth0".to_string()));
    assert_eq!(seen.len(), 1);
}

#[test]
fn test_enumeration_failure() {
    let stack = MemoryStack::new(4);
    stack.set_listing_available(false);
    let err = device::devices(&stack, "ifconfig").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::EnumerationFailed);
}

#[tokio::test]
async fn test_ifconfig_without_device_shows_all() {
    let stack = stack();
    let outcome = ifconfig(&stack, &Capabilities::default(), "ifconfig")
        .await
        .unwrap();
    let IfconfigOutcome::Status {
        devices: statuses, ..
    } = outcome
    else {
        panic!("expected status");
    };
    let names: Vec<&str> = statuses.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["eth0", "eth1"]);
}

#[tokio::test]
async fn test_ifup_then_status() {
    let stack = stack();
    let outcome = device::set_link(&stack, &stack, "ifup", &["eth1"], true)
        .await
        .unwrap();
    let LinkOutcome::Switched { ifname, failure } = outcome else {
        panic!("expected switch");
    };
    assert_eq!(ifname, "eth1");
    assert!(failure.is_none());
    assert_eq!(stack.calls(), vec![Call::SetLink("eth1".into(), true)]);
    assert!(stack.device_status("eth1").unwrap().up);
}

#[tokio::test]
async fn test_ifdown_with_two_names_lists_choices() {
    let stack = stack();
    let outcome = device::set_link(&stack, &stack, "ifdown", &["eth0", "eth1"], false)
        .await
        .unwrap();
    let LinkOutcome::Choices(names) = outcome else {
        panic!("expected choices");
    };
    assert_eq!(names, vec!["eth0", "eth1"]);
    assert!(stack.calls().is_empty());
}
