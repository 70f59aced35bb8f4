//! Shared scaffolding: throwaway `ip netns` namespaces and the root guard.

use lbnet::netlink::{self, Connection};
use lbnet::{HandleConfig, NetlinkHandle};
use std::process::Command;
use std::sync::atomic::{AtomicU32, Ordering};

/// Result type for integration tests, which mix transport and layer errors.
pub type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

static NAMESPACE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Names are unique across parallel tests and concurrent test binaries.
fn unique_ns_name(prefix: &str) -> String {
    format!(
        "lbnet-test-{prefix}-{}-{}",
        std::process::id(),
        NAMESPACE_COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

/// A test network namespace, deleted on drop.
pub struct TestNamespace {
    name: String,
}

impl TestNamespace {
    pub fn new(prefix: &str) -> netlink::Result<Self> {
        let name = unique_ns_name(prefix);
        if !Command::new("ip").args(["netns", "add", &name]).status()?.success() {
            return Err(netlink::Error::InvalidMessage(format!(
                "ip netns add {name} failed"
            )));
        }
        Ok(Self { name })
    }

    #[allow(dead_code)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw rtnetlink connection inside this namespace.
    #[allow(dead_code)]
    pub fn connection(&self) -> netlink::Result<Connection> {
        Connection::for_namespace(&self.name)
    }

    /// Reconciliation handle inside this namespace.
    pub fn handle(&self, ipv6: bool) -> lbnet::Result<NetlinkHandle<Connection>> {
        NetlinkHandle::connect(HandleConfig::new().ipv6(ipv6).namespace(&self.name))
    }

    /// Run `cmd` inside the namespace, returning stdout.
    pub fn exec(&self, cmd: &str, args: &[&str]) -> netlink::Result<String> {
        let output = Command::new("ip")
            .args(["netns", "exec", &self.name, cmd])
            .args(args)
            .output()?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        Err(netlink::Error::InvalidMessage(format!(
            "{cmd} {}: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim_end()
        )))
    }

    /// Add a dummy interface with the ip command and bring it up.
    pub fn add_dummy_up(&self, name: &str) -> netlink::Result<()> {
        self.exec("ip", &["link", "add", name, "type", "dummy"])?;
        self.exec("ip", &["link", "set", name, "up"])?;
        Ok(())
    }

    /// `ip addr add` without going through the reconciler.
    #[allow(dead_code)]
    pub fn add_addr(&self, dev: &str, addr: &str) -> netlink::Result<()> {
        self.exec("ip", &["addr", "add", addr, "dev", dev])?;
        Ok(())
    }

    /// `ip -d link show` output for one device, `None` if it is absent.
    #[allow(dead_code)]
    pub fn link_details(&self, dev: &str) -> Option<String> {
        self.exec("ip", &["-d", "link", "show", dev]).ok()
    }
}

impl Drop for TestNamespace {
    fn drop(&mut self) {
        let _ = Command::new("ip")
            .args(["netns", "del", &self.name])
            .status();
    }
}

pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions.
    unsafe { libc::geteuid() == 0 }
}

/// Return early from a `TestResult` test when not running as root.
#[macro_export]
macro_rules! require_root {
    () => {
        if !crate::common::is_root() {
            eprintln!("Skipping test: requires root");
            return Ok(());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ns_name() {
        let name1 = unique_ns_name("test");
        let name2 = unique_ns_name("test");
        assert_ne!(name1, name2);
        assert!(name1.starts_with("lbnet-test-test-"));
    }
}
