//! ifconfig command sequences against the memory stack.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use nshnet::Capabilities;
use nshnet::ErrorKind;
use nshnet::backend::Call;
use nshnet::ifconfig::{IfconfigOutcome, ResolvedAddressSet, classify, resolve};

use crate::common::{ifconfig, stack};

fn v4(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
    Ipv4Addr::new(a, b, c, d)
}

#[tokio::test]
async fn test_default_gateway_independent_of_order() {
    let caps = Capabilities::default();
    for line in [
        "ifconfig eth0 10.1.2.3 netmask 255.255.0.0",
        "ifconfig eth0 netmask 255.255.0.0 10.1.2.3",
    ] {
        let stack = stack();
        ifconfig(&stack, &caps, line).await.unwrap();
        assert!(
            stack
                .calls()
                .contains(&Call::SetIpv4Gateway("eth0".into(), v4(10, 1, 0, 1))),
            "{}",
            line
        );
    }
}

#[test]
fn test_embedded_prefix_and_explicit_override() {
    let caps = Capabilities::default();

    let tokens = ["ifconfig", "eth0", "10.0.0.5/24"];
    let request = classify(&tokens, &caps).unwrap();
    let ResolvedAddressSet::Ipv4(cfg) = resolve(&request, &caps).unwrap().addresses else {
        panic!("expected ipv4");
    };
    assert_eq!(cfg.prefix_len, 24);
    assert_eq!(cfg.netmask, v4(255, 255, 255, 0));

    let tokens = ["ifconfig", "eth0", "10.0.0.5/24", "prefixlen", "16"];
    let request = classify(&tokens, &caps).unwrap();
    let ResolvedAddressSet::Ipv4(cfg) = resolve(&request, &caps).unwrap().addresses else {
        panic!("expected ipv4");
    };
    assert_eq!(cfg.prefix_len, 16);
    assert_eq!(cfg.netmask, v4(255, 255, 0, 0));
}

#[tokio::test]
async fn test_mtu_only_pushes_mtu() {
    let stack = stack();
    let outcome = ifconfig(&stack, &Capabilities::default(), "ifconfig eth0 mtu 500")
        .await
        .unwrap();
    assert!(matches!(outcome, IfconfigOutcome::Configured));
    assert_eq!(stack.calls(), vec![Call::SetMtu("eth0".into(), 1280)]);
}

#[tokio::test]
async fn test_full_ipv4_request() {
    let stack = stack();
    ifconfig(
        &stack,
        &Capabilities::default(),
        "ifconfig eth0 192.168.1.20 netmask 255.255.255.0 gw 192.168.1.254 dns 9.9.9.9",
    )
    .await
    .unwrap();

    assert_eq!(
        stack.calls(),
        vec![
            Call::SetIpv4Addr("eth0".into(), v4(192, 168, 1, 20)),
            Call::SetIpv4Netmask("eth0".into(), v4(255, 255, 255, 0)),
            Call::SetIpv4Gateway("eth0".into(), v4(192, 168, 1, 254)),
            Call::SetDns(IpAddr::V4(v4(9, 9, 9, 9))),
        ]
    );
    let status = stack.device_status("eth0").unwrap();
    assert_eq!(status.ipv4, Some(v4(192, 168, 1, 20)));
    assert_eq!(status.netmask, Some(v4(255, 255, 255, 0)));
}

#[tokio::test]
async fn test_ipv6_gateway_only_when_explicit() {
    let stack = stack();
    ifconfig(&stack, &Capabilities::default(), "ifconfig eth0 inet6 fc00::5")
        .await
        .unwrap();
    let calls = stack.calls();
    assert!(!calls.iter().any(|c| matches!(c, Call::SetIpv6Gateway(..))));
    assert!(!calls.iter().any(|c| matches!(c, Call::SetDns(_))));
    assert!(calls.contains(&Call::SetIpv6Netmask(
        "eth0".into(),
        "ffff:ffff:ffff:ffff::".parse().unwrap()
    )));
}

#[tokio::test]
async fn test_ipv6_only_target_defaults_to_ipv6() {
    let stack = stack();
    let caps = Capabilities::ipv6_only();
    ifconfig(&stack, &caps, "ifconfig eth0 fc00::5/96").await.unwrap();

    let mask: Ipv6Addr = "ffff:ffff:ffff:ffff:ffff:ffff::".parse().unwrap();
    assert_eq!(
        stack.calls(),
        vec![
            Call::SetIpv6Addr("eth0".into(), "fc00::5".parse().unwrap()),
            Call::SetIpv6Netmask("eth0".into(), mask),
        ]
    );
}

#[tokio::test]
async fn test_multi_ipv6_add_shows_in_status() {
    let stack = stack();
    let caps = Capabilities::default().with_multi_ipv6(true);
    ifconfig(&stack, &caps, "ifconfig eth1 inet6 add fc00::1:2/112")
        .await
        .unwrap();

    let status = stack.device_status("eth1").unwrap();
    assert!(status.ipv6.contains(&("fc00::1:2".parse().unwrap(), 112)));
}

#[tokio::test]
async fn test_errors_make_no_calls() {
    let caps = Capabilities::default();
    for (line, kind) in [
        ("ifconfig eth0 10.0.0.5 gw", ErrorKind::MissingArgument),
        ("ifconfig eth0 10.0.0.5 10.0.0.6", ErrorKind::InvalidArgument),
        ("ifconfig eth0 10.0.0.300", ErrorKind::InvalidArgument),
        ("ifconfig eth0 10.0.0.5/33", ErrorKind::InvalidArgument),
        ("ifconfig eth0 inet6 add fc00::1", ErrorKind::InvalidArgument),
        ("ifconfig eth0 10.0.0.5 dns fc00::53", ErrorKind::InvalidArgument),
        ("ifconfig eth0 inet6 fc00::2 dns 10.0.0.53", ErrorKind::InvalidArgument),
    ] {
        let stack = stack();
        let err = ifconfig(&stack, &caps, line).await.unwrap_err();
        assert_eq!(err.kind(), kind, "{}", line);
        assert!(stack.calls().is_empty(), "{}", line);
    }
}

#[tokio::test]
async fn test_failure_reports_operation_and_errno() {
    let stack = stack();
    stack.fail_on("set_ipv4_netmask", libc::EPERM);
    let err = ifconfig(&stack, &Capabilities::default(), "ifconfig eth0 10.0.0.5")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CommandFailed);
    assert_eq!(err.errno(), Some(libc::EPERM));
    assert_eq!(
        stack.calls(),
        vec![Call::SetIpv4Addr("eth0".into(), v4(10, 0, 0, 5))]
    );
}
