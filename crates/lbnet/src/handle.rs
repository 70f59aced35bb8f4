//! One handle for every reconciliation operation.

use std::collections::BTreeSet;
use std::net::IpAddr;

use crate::address::AddressBinder;
use crate::default_route::{CommandRunner, DefaultRouteInspector, SystemCommandRunner};
use crate::device::DeviceManager;
use crate::error::{Error, Result};
use crate::kernel::{Kernel, Route};
use crate::local::{LocalAddressScanner, LocalAddressStrategy};
use crate::netlink::Connection;
use crate::route::RouteManager;

/// Configuration for a [`NetlinkHandle`].
///
/// # Example
///
/// ```
/// use lbnet::HandleConfig;
///
/// let config = HandleConfig::new().ipv6(true).namespace("blue");
/// assert!(config.is_ipv6());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HandleConfig {
    ipv6: bool,
    namespace: Option<String>,
    route_command: String,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            ipv6: false,
            namespace: None,
            route_command: "ip".to_owned(),
        }
    }
}

impl HandleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan IPv6 instead of IPv4 local addresses.
    pub fn ipv6(mut self, ipv6: bool) -> Self {
        self.ipv6 = ipv6;
        self
    }

    /// Operate inside the named network namespace (`ip netns` name).
    pub fn namespace(mut self, name: impl Into<String>) -> Self {
        self.namespace = Some(name.into());
        self
    }

    /// Command used to list routes for the default-interface lookup.
    pub fn route_command(mut self, command: impl Into<String>) -> Self {
        self.route_command = command.into();
        self
    }

    pub fn is_ipv6(&self) -> bool {
        self.ipv6
    }

    pub fn namespace_name(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

/// Bundles the components over one kernel collaborator.
pub struct NetlinkHandle<K, C = SystemCommandRunner> {
    kernel: K,
    runner: C,
    config: HandleConfig,
}

impl NetlinkHandle<Connection, SystemCommandRunner> {
    /// Open an rtnetlink connection, in the configured namespace if any.
    pub fn connect(config: HandleConfig) -> Result<Self> {
        let kernel = match config.namespace_name() {
            Some(name) => Connection::for_namespace(name)
                .map_err(|e| Error::kernel(format!("connect in namespace {name}"), e))?,
            None => Connection::new().map_err(|e| Error::kernel("connect", e))?,
        };
        tracing::debug!(namespace = ?config.namespace_name(), ipv6 = config.ipv6, "connected");
        Ok(Self::with_parts(kernel, SystemCommandRunner, config))
    }
}

impl<K: Kernel, C: CommandRunner> NetlinkHandle<K, C> {
    pub fn with_parts(kernel: K, runner: C, config: HandleConfig) -> Self {
        Self {
            kernel,
            runner,
            config,
        }
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn config(&self) -> &HandleConfig {
        &self.config
    }

    pub fn devices(&self) -> DeviceManager<'_, K> {
        DeviceManager::new(&self.kernel)
    }

    pub fn addresses(&self) -> AddressBinder<'_, K> {
        AddressBinder::new(&self.kernel)
    }

    pub fn routes(&self) -> RouteManager<'_, K> {
        RouteManager::new(&self.kernel)
    }

    pub fn local_addresses(&self) -> LocalAddressScanner<'_, K> {
        LocalAddressScanner::new(
            &self.kernel,
            LocalAddressStrategy::for_family(self.config.ipv6),
        )
    }

    pub fn default_route(&self) -> DefaultRouteInspector<'_, C> {
        DefaultRouteInspector::new(&self.runner, &self.config.route_command)
    }

    pub fn ensure_address_bind(&self, address: &str, device: &str) -> Result<bool> {
        self.addresses().ensure_address_bind(address, device)
    }

    pub fn unbind_address(&self, address: &str, device: &str) -> Result<()> {
        self.addresses().unbind_address(address, device)
    }

    pub fn list_bound_addresses(&self, device: &str) -> Result<Vec<IpAddr>> {
        self.addresses().list_bound_addresses(device)
    }

    pub fn ensure_dummy_device(&self, name: &str) -> Result<bool> {
        self.devices().ensure_dummy_device(name)
    }

    pub fn delete_dummy_device(&self, name: &str) -> Result<()> {
        self.devices().delete_dummy_device(name)
    }

    pub fn ensure_xfrm_interface(&self, name: &str, if_id: u32) -> Result<()> {
        self.devices().ensure_xfrm_interface(name, if_id)
    }

    pub fn delete_xfrm_interface(&self, name: &str) -> Result<()> {
        self.devices().delete_xfrm_interface(name)
    }

    pub fn get_route(&self, subnet: &str, device: &str) -> Result<Route> {
        self.routes().get_route(subnet, device)
    }

    pub fn ensure_route_add(&self, subnet: &str, device: &str) -> Result<()> {
        self.routes().ensure_route_add(subnet, device)
    }

    pub fn delete_route(&self, subnet: &str, device: &str) -> Result<()> {
        self.routes().delete_route(subnet, device)
    }

    pub fn get_local_addresses(
        &self,
        device: Option<&str>,
        filter_device: Option<&str>,
    ) -> Result<BTreeSet<IpAddr>> {
        self.local_addresses().get_local_addresses(device, filter_device)
    }

    pub fn get_default_interface(&self) -> Result<String> {
        self.default_route().get_default_interface()
    }
}
