//! Discovery of addresses owned by this host.
//!
//! The kernel installs a `local` route in the local table (id 255) for every
//! address configured on the host. Scanning those routes gives the set of
//! addresses traffic can be delivered to locally, including addresses on
//! dummy devices that never show up as a neighbour anywhere.

use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv6Addr};

use crate::address::resolve;
use crate::error::{Error, Result};
use crate::kernel::{LinkOps, Route, RouteFilter, RouteOps};

/// Which route field carries the local address for a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LocalAddressStrategy {
    /// Use the preferred source of each local route.
    Ipv4Source,
    /// Use the destination of each local route.
    Ipv6Destination,
}

impl LocalAddressStrategy {
    pub fn for_family(ipv6: bool) -> Self {
        if ipv6 {
            Self::Ipv6Destination
        } else {
            Self::Ipv4Source
        }
    }

    fn local_address(self, route: &Route) -> Option<IpAddr> {
        match self {
            Self::Ipv4Source => ipv4_local_address(route),
            Self::Ipv6Destination => ipv6_local_address(route),
        }
    }
}

/// `fe80::/10`
fn is_unicast_link_local(addr: &Ipv6Addr) -> bool {
    (addr.segments()[0] & 0xffc0) == 0xfe80
}

/// The destination of an IPv6 local route, unless it is IPv4, IPv4-mapped
/// or link-local.
pub fn ipv6_local_address(route: &Route) -> Option<IpAddr> {
    match route.destination.addr() {
        IpAddr::V6(v6) if v6.to_ipv4_mapped().is_none() && !is_unicast_link_local(&v6) => {
            Some(IpAddr::V6(v6))
        }
        _ => None,
    }
}

/// The preferred source of a local route.
pub fn ipv4_local_address(route: &Route) -> Option<IpAddr> {
    route.source
}

/// Scans the local routing table for one address family.
pub struct LocalAddressScanner<'a, K> {
    kernel: &'a K,
    strategy: LocalAddressStrategy,
}

impl<'a, K: LinkOps + RouteOps> LocalAddressScanner<'a, K> {
    pub fn new(kernel: &'a K, strategy: LocalAddressStrategy) -> Self {
        Self { kernel, strategy }
    }

    pub fn strategy(&self) -> LocalAddressStrategy {
        self.strategy
    }

    /// Addresses owned by this host.
    ///
    /// With `device`, only addresses on that interface. Otherwise with
    /// `filter_device`, addresses on every interface except that one.
    /// `device` wins when both are given.
    pub fn get_local_addresses(
        &self,
        device: Option<&str>,
        filter_device: Option<&str>,
    ) -> Result<BTreeSet<IpAddr>> {
        let mut filter = RouteFilter::local_table();
        let mut excluded = None;

        if let Some(name) = device {
            filter = filter.with_index(resolve(self.kernel, name)?.index);
        } else if let Some(name) = filter_device {
            excluded = Some(resolve(self.kernel, name)?.index);
        }

        let routes = self
            .kernel
            .list_routes(&filter)
            .map_err(|e| Error::kernel("list local routes", e))?;

        let addresses: BTreeSet<IpAddr> = routes
            .iter()
            .filter(|r| Some(r.index) != excluded)
            .filter_map(|r| self.strategy.local_address(r))
            .collect();

        tracing::debug!(
            count = addresses.len(),
            strategy = ?self.strategy,
            "scanned local addresses"
        );
        Ok(addresses)
    }
}
