//! Address integration tests.

use std::net::IpAddr;

use crate::common::{TestNamespace, TestResult};

#[test]
fn test_bind_ipv4_address() -> TestResult {
    require_root!();

    let ns = TestNamespace::new("addr4")?;
    let handle = ns.handle(false)?;
    handle.ensure_dummy_device("kube-ipvs0")?;

    assert!(!handle.ensure_address_bind("10.96.0.10", "kube-ipvs0")?);
    assert!(handle.ensure_address_bind("10.96.0.10", "kube-ipvs0")?);

    let bound = handle.list_bound_addresses("kube-ipvs0")?;
    assert_eq!(bound, ["10.96.0.10".parse::<IpAddr>()?]);

    let out = ns.exec("ip", &["addr", "show", "kube-ipvs0"])?;
    assert!(out.contains("10.96.0.10/32"));

    Ok(())
}

#[test]
fn test_bind_ipv6_address() -> TestResult {
    require_root!();

    let ns = TestNamespace::new("addr6")?;
    let handle = ns.handle(true)?;
    handle.ensure_dummy_device("kube-ipvs0")?;

    assert!(!handle.ensure_address_bind("fd00:10::10", "kube-ipvs0")?);

    let out = ns.exec("ip", &["-6", "addr", "show", "kube-ipvs0"])?;
    assert!(out.contains("fd00:10::10/128"));

    Ok(())
}

#[test]
fn test_unbind_address() -> TestResult {
    require_root!();

    let ns = TestNamespace::new("unbind")?;
    let handle = ns.handle(false)?;
    handle.ensure_dummy_device("kube-ipvs0")?;

    // never bound
    handle.unbind_address("10.96.0.10", "kube-ipvs0")?;

    handle.ensure_address_bind("10.96.0.10", "kube-ipvs0")?;
    handle.unbind_address("10.96.0.10", "kube-ipvs0")?;
    assert!(handle.list_bound_addresses("kube-ipvs0")?.is_empty());

    Ok(())
}

#[test]
fn test_bind_to_missing_device() -> TestResult {
    require_root!();

    let ns = TestNamespace::new("nodev")?;
    let handle = ns.handle(false)?;

    let err = handle
        .ensure_address_bind("10.96.0.10", "kube-ipvs0")
        .unwrap_err();
    assert!(err.is_not_found());

    Ok(())
}
