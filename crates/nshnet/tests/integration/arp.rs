//! ARP table operations.

use std::net::Ipv4Addr;

use nshnet::ErrorKind;
use nshnet::arp::{self, ArpEntry, ArpFlag, ArpOutcome};
use nshnet::backend::MemoryStack;

use crate::common::stack;

const MAC: [u8; 6] = [0x02, 0x00, 0x5e, 0x10, 0x00, 0x01];

#[tokio::test]
async fn test_set_get_delete_cycle() {
    let stack = stack();
    stack.add_device_with_ipv4(
        "eth2",
        Ipv4Addr::new(192, 168, 7, 1),
        Ipv4Addr::new(255, 255, 255, 0),
    );

    let outcome = arp::run(&stack, 16, ArpFlag::Set, None, &["192.168.7.9", "02:00:5e:10:00:01"])
        .await
        .unwrap();
    assert_eq!(outcome, ArpOutcome::Set);

    let outcome = arp::run(&stack, 16, ArpFlag::Get, None, &["192.168.7.9"])
        .await
        .unwrap();
    assert_eq!(outcome, ArpOutcome::Mapping(MAC));

    let outcome = arp::run(&stack, 16, ArpFlag::Delete, None, &["192.168.7.9"])
        .await
        .unwrap();
    assert_eq!(outcome, ArpOutcome::Deleted);

    let err = arp::run(&stack, 16, ArpFlag::Get, None, &["192.168.7.9"])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoSuchEntry);
    assert_eq!(err.to_string(), "arp: no such ARP entry: 192.168.7.9");
}

#[tokio::test]
async fn test_list_filtered_by_interface() {
    let stack = stack();
    stack.insert_arp(ArpEntry::new(Ipv4Addr::new(10, 0, 0, 2), MAC, "eth0"));
    stack.insert_arp(ArpEntry::new(Ipv4Addr::new(10, 0, 1, 2), MAC, "eth1"));
    stack.insert_arp(ArpEntry::new(Ipv4Addr::new(10, 0, 1, 3), MAC, "eth1"));

    let outcome = arp::run(&stack, 16, ArpFlag::Get, Some("eth1"), &[] as &[&str])
        .await
        .unwrap();
    let ArpOutcome::Listing(entries) = outcome else {
        panic!("expected listing");
    };
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.ifname == "eth1"));
}

#[tokio::test]
async fn test_full_table_evicts_oldest() {
    let stack = MemoryStack::new(2);
    stack.add_device("eth0");
    for last in 1..=3 {
        stack.insert_arp(ArpEntry::new(Ipv4Addr::new(10, 0, 0, last), MAC, "eth0"));
    }

    let outcome = arp::run(&stack, 2, ArpFlag::None, None, &[] as &[&str])
        .await
        .unwrap();
    let ArpOutcome::Listing(entries) = outcome else {
        panic!("expected listing");
    };
    let ips: Vec<Ipv4Addr> = entries.iter().map(|e| e.ip).collect();
    assert_eq!(ips, vec![Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(10, 0, 0, 3)]);
}

#[tokio::test]
async fn test_operand_shape_errors() {
    let stack = stack();
    let cases: [(ArpFlag, &[&str], ErrorKind); 5] = [
        (ArpFlag::Delete, &[], ErrorKind::MissingArgument),
        (ArpFlag::Set, &["10.0.0.1"], ErrorKind::MissingArgument),
        (ArpFlag::Get, &["10.0.0.1", "10.0.0.2"], ErrorKind::MissingArgument),
        (ArpFlag::Delete, &["10.0.0.1", "10.0.0.2"], ErrorKind::MissingArgument),
        (ArpFlag::Delete, &["10.0.0"], ErrorKind::InvalidArgument),
    ];
    for (flag, operands, kind) in cases {
        let err = arp::run(&stack, 16, flag, None, operands).await.unwrap_err();
        assert_eq!(err.kind(), kind, "{:?} {:?}", flag, operands);
    }
}
