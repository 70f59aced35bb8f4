//! Local address discovery integration tests.

use std::net::IpAddr;

use crate::common::{TestNamespace, TestResult};

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[test]
fn test_ipv4_local_addresses() -> TestResult {
    require_root!();

    let ns = TestNamespace::new("local4")?;
    ns.add_dummy_up("eth0")?;
    ns.add_dummy_up("kube-ipvs0")?;
    ns.add_addr("eth0", "10.0.0.5/24")?;
    let handle = ns.handle(false)?;
    handle.ensure_address_bind("10.96.0.10", "kube-ipvs0")?;

    let all = handle.get_local_addresses(None, None)?;
    assert!(all.contains(&ip("10.0.0.5")));
    assert!(all.contains(&ip("10.96.0.10")));

    let host = handle.get_local_addresses(None, Some("kube-ipvs0"))?;
    assert!(host.contains(&ip("10.0.0.5")));
    assert!(!host.contains(&ip("10.96.0.10")));

    let services = handle.get_local_addresses(Some("kube-ipvs0"), None)?;
    assert_eq!(services.into_iter().collect::<Vec<_>>(), [ip("10.96.0.10")]);

    Ok(())
}

#[test]
fn test_ipv6_local_addresses() -> TestResult {
    require_root!();

    let ns = TestNamespace::new("local6")?;
    ns.add_dummy_up("eth0")?;
    ns.add_addr("eth0", "2001:db8::1/64")?;
    let handle = ns.handle(true)?;

    // dummy devices skip duplicate address detection, so the route is there at once
    let found = handle.get_local_addresses(Some("eth0"), None)?;
    assert!(found.contains(&ip("2001:db8::1")));
    assert!(found.iter().all(|a| match a {
        IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) != 0xfe80,
        IpAddr::V4(_) => false,
    }));

    Ok(())
}
