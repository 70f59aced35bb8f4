//! Route integration tests.

use lbnet::Error;
use lbnet::netlink::RouteScope;

use crate::common::{TestNamespace, TestResult};

#[test]
fn test_ensure_route_add() -> TestResult {
    require_root!();

    let ns = TestNamespace::new("route")?;
    ns.add_dummy_up("svc0")?;
    let handle = ns.handle(false)?;

    let route = handle.get_route("10.96.1.1/16", "svc0")?;
    assert_eq!(route.destination.to_string(), "10.96.0.0/16");
    assert_eq!(route.scope, RouteScope::Link);

    handle.ensure_route_add("10.96.1.1/16", "svc0")?;
    handle.ensure_route_add("10.96.0.0/16", "svc0")?;

    let out = ns.exec("ip", &["route", "show", "dev", "svc0"])?;
    assert!(out.contains("10.96.0.0/16"));
    assert!(out.contains("scope link"));

    Ok(())
}

#[test]
fn test_delete_route() -> TestResult {
    require_root!();

    let ns = TestNamespace::new("delroute")?;
    ns.add_dummy_up("svc0")?;
    let handle = ns.handle(false)?;

    handle.ensure_route_add("10.96.0.0/16", "svc0")?;
    handle.delete_route("10.96.0.0/16", "svc0")?;

    let out = ns.exec("ip", &["route", "show", "dev", "svc0"])?;
    assert!(!out.contains("10.96.0.0/16"));

    // a missing route is reported
    assert!(matches!(
        handle.delete_route("10.96.0.0/16", "svc0"),
        Err(Error::Kernel { .. })
    ));

    Ok(())
}

#[test]
fn test_ipv6_route() -> TestResult {
    require_root!();

    let ns = TestNamespace::new("route6")?;
    ns.add_dummy_up("svc0")?;
    let handle = ns.handle(true)?;

    handle.ensure_route_add("fd00:96::/64", "svc0")?;
    handle.ensure_route_add("fd00:96::/64", "svc0")?;

    let out = ns.exec("ip", &["-6", "route", "show", "dev", "svc0"])?;
    assert!(out.contains("fd00:96::/64"));

    handle.delete_route("fd00:96::/64", "svc0")?;

    Ok(())
}
