//! Device integration tests.

use lbnet::{Error, LinkKind};

use crate::common::{TestNamespace, TestResult};

#[test]
fn test_ensure_dummy_device() -> TestResult {
    require_root!();

    let ns = TestNamespace::new("dummy")?;
    let handle = ns.handle(false)?;

    assert!(!handle.ensure_dummy_device("kube-ipvs0")?);
    assert!(handle.ensure_dummy_device("kube-ipvs0")?);

    let details = ns.link_details("kube-ipvs0").expect("device exists");
    assert!(details.contains("dummy"));

    Ok(())
}

#[test]
fn test_delete_dummy_device() -> TestResult {
    require_root!();

    let ns = TestNamespace::new("deldummy")?;
    let handle = ns.handle(false)?;

    handle.ensure_dummy_device("kube-ipvs0")?;
    handle.delete_dummy_device("kube-ipvs0")?;
    assert!(ns.link_details("kube-ipvs0").is_none());

    // already gone
    handle.delete_dummy_device("kube-ipvs0")?;

    Ok(())
}

#[test]
fn test_delete_dummy_refuses_loopback() -> TestResult {
    require_root!();

    let ns = TestNamespace::new("kind")?;
    let handle = ns.handle(false)?;

    match handle.delete_dummy_device("lo") {
        Err(Error::KindMismatch { actual, .. }) => assert_eq!(actual, LinkKind::Other(None)),
        other => panic!("expected kind mismatch, got {other:?}"),
    }
    assert!(ns.link_details("lo").is_some());

    Ok(())
}

#[test]
fn test_xfrm_interface() -> TestResult {
    require_root!();

    let ns = TestNamespace::new("xfrm")?;
    let handle = ns.handle(false)?;

    match handle.ensure_xfrm_interface("xfrm0", 42) {
        Ok(()) => {}
        Err(Error::Kernel { source, .. })
            if source.errno() == Some(libc::EOPNOTSUPP) =>
        {
            eprintln!("Skipping test: kernel lacks xfrm interface support");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    let details = ns.link_details("xfrm0").expect("device exists");
    assert!(details.contains("xfrm"));
    assert!(details.contains("if_id 0x2a"));
    assert!(details.contains("UP"));

    // idempotent
    handle.ensure_xfrm_interface("xfrm0", 42)?;

    assert!(handle.delete_dummy_device("xfrm0").is_err());
    handle.delete_xfrm_interface("xfrm0")?;
    handle.delete_xfrm_interface("xfrm0")?;
    assert!(ns.link_details("xfrm0").is_none());

    Ok(())
}
