//! get/put, wget and nslookup drivers.

use std::borrow::Cow;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use nshnet::ErrorKind;
use nshnet::backend::{Call, MemoryStack};
use nshnet::nslookup::{self, HostEntry};
use nshnet::transfer::{self, TransferArgs, TransferMode, WgetArgs};

#[test]
fn test_get_derives_owned_destination() {
    let operands = ["/remote/file.bin"];
    let args = TransferArgs::parse(
        "get",
        TransferMode::Text,
        None,
        Some("10.0.0.1"),
        &operands,
    )
    .unwrap();
    assert_eq!(args.dest, Cow::<str>::Owned("file.bin".to_string()));
    assert!(args.dest_is_derived());
    assert_eq!(args.host, Ipv4Addr::new(10, 0, 0, 1));
    assert_eq!(args.mode, TransferMode::Text);
}

#[test]
fn test_unspecified_host_is_missing() {
    let operands = ["a.txt"];
    let err = TransferArgs::parse("put", TransferMode::Binary, None, Some("0.0.0.0"), &operands)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingArgument);
}

#[tokio::test]
async fn test_get_and_put_calls() {
    let stack = MemoryStack::new(4);
    let cwd = Path::new("/work");

    let operands = ["/srv/boot.img"];
    let args = TransferArgs::parse(
        "get",
        TransferMode::Binary,
        Some("local.img"),
        Some("10.0.0.1"),
        &operands,
    )
    .unwrap();
    transfer::get(&stack, &args, cwd).await.unwrap();

    let operands = ["notes.txt"];
    let args = TransferArgs::parse("put", TransferMode::Text, None, Some("10.0.0.1"), &operands)
        .unwrap();
    transfer::put(&stack, &args, cwd).await.unwrap();

    assert_eq!(
        stack.calls(),
        vec![
            Call::TftpGet {
                remote: "/srv/boot.img".into(),
                local: "/work/local.img".into(),
                host: Ipv4Addr::new(10, 0, 0, 1),
                mode: TransferMode::Binary,
            },
            Call::TftpPut {
                local: "/work/notes.txt".into(),
                remote: "notes.txt".into(),
                host: Ipv4Addr::new(10, 0, 0, 1),
                mode: TransferMode::Text,
            },
        ]
    );
}

#[tokio::test]
async fn test_wget_streams_into_derived_file() {
    let dir = tempfile::tempdir().unwrap();

    let stack = MemoryStack::new(4);
    let body = vec![0x5a; 2000];
    stack.add_document("http://10.0.0.1/fw/update.bin", &body);

    let operands = ["http://10.0.0.1/fw/update.bin"];
    let args = WgetArgs::parse(None, &operands).unwrap();
    assert_eq!(args.local, "update.bin");

    let written = transfer::wget(&stack, &args, dir.path()).await.unwrap();
    assert_eq!(written, 2000);
    assert_eq!(std::fs::read(dir.path().join("update.bin")).unwrap(), body);
}

#[tokio::test]
async fn test_nslookup_operands_and_rows() {
    let stack = MemoryStack::new(4);
    let addr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 80));
    stack.add_host("www", vec![HostEntry::new("www.example.net", addr)]);

    let entries = nslookup::lookup(&stack, &["www"]).await.unwrap();
    assert_eq!(entries, vec![HostEntry::new("www.example.net", addr)]);

    let err = nslookup::lookup(&stack, &[] as &[&str]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingArgument);

    let err = nslookup::lookup(&stack, &["a", "b"]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TooManyArguments);
}
