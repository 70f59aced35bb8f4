//! Kernel collaborator seam.
//!
//! Components never talk to a socket directly; they are generic over the
//! narrow capability traits defined here. [`Connection`] implements all of
//! them against a live kernel, tests use an in-memory fake.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnet::IpNet;

use crate::netlink::types::rt_table;
use crate::netlink::{
    self, Connection, LinkMessage, RouteMessage, RouteProtocol, RouteScope, RouteType,
};
use crate::netlink::link::{DummyLink, XfrmLink};

/// Kind of a network interface, from `IFLA_INFO_KIND`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LinkKind {
    Dummy,
    Xfrm,
    /// Any other kind; `None` for physical devices and loopback, which carry
    /// no kind attribute.
    Other(Option<String>),
}

impl LinkKind {
    pub fn from_kind(kind: Option<&str>) -> Self {
        match kind {
            Some("dummy") => Self::Dummy,
            Some("xfrm") => Self::Xfrm,
            other => Self::Other(other.map(str::to_owned)),
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dummy => f.write_str("dummy"),
            Self::Xfrm => f.write_str("xfrm"),
            Self::Other(Some(kind)) => f.write_str(kind),
            Self::Other(None) => f.write_str("device"),
        }
    }
}

/// A network interface resolved by name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Link {
    pub name: String,
    pub index: u32,
    pub kind: LinkKind,
}

impl From<LinkMessage> for Link {
    fn from(msg: LinkMessage) -> Self {
        Self {
            name: msg.name().unwrap_or_default().to_owned(),
            index: msg.ifindex(),
            kind: LinkKind::from_kind(msg.kind()),
        }
    }
}

/// A route as built by the reconciler or read back from the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Route {
    /// Destination network, host bits cleared.
    pub destination: IpNet,
    /// Output interface index.
    pub index: u32,
    pub scope: RouteScope,
    /// Preferred source address (`RTA_PREFSRC`). Only set on reads.
    pub source: Option<IpAddr>,
    pub table: u32,
    pub route_type: RouteType,
    pub protocol: RouteProtocol,
}

impl Route {
    /// A link-scope device route to `destination` in the main table.
    pub fn device_route(destination: IpNet, index: u32) -> Self {
        Self {
            destination: destination.trunc(),
            index,
            scope: RouteScope::Link,
            source: None,
            table: rt_table::MAIN,
            route_type: RouteType::Unicast,
            protocol: RouteProtocol::Boot,
        }
    }

    fn from_message(msg: &RouteMessage) -> Option<Self> {
        let unspecified = match i32::from(msg.family()) {
            libc::AF_INET => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            libc::AF_INET6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            _ => return None,
        };
        let dst = msg.destination().copied().unwrap_or(unspecified);
        let destination = IpNet::new(dst, msg.dst_len()).ok()?;

        Some(Self {
            destination,
            index: msg.oif().unwrap_or(0),
            scope: msg.scope(),
            source: msg.prefsrc().copied(),
            table: msg.table_id(),
            route_type: msg.route_type(),
            protocol: msg.protocol(),
        })
    }
}

/// Selects routes from a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteFilter {
    pub table: u32,
    pub route_type: RouteType,
    pub protocol: RouteProtocol,
    /// Restrict to one output interface.
    pub index: Option<u32>,
}

impl RouteFilter {
    /// Kernel-installed `local` routes in the local table: one per address
    /// configured on the host.
    pub fn local_table() -> Self {
        Self {
            table: rt_table::LOCAL,
            route_type: RouteType::Local,
            protocol: RouteProtocol::Kernel,
            index: None,
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn matches(&self, route: &Route) -> bool {
        route.table == self.table
            && route.route_type == self.route_type
            && route.protocol == self.protocol
            && self.index.is_none_or(|index| route.index == index)
    }
}

/// How a failed mutation relates to the desired state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationError {
    /// The object being created is already there.
    AlreadyExists,
    /// The object being removed is already gone.
    AlreadyAbsent,
    Other,
}

/// Map a kernel error onto the two outcomes reconciliation treats as
/// convergence.
pub fn classify_mutation_error(err: &netlink::Error) -> MutationError {
    match err.errno() {
        Some(libc::EEXIST) => MutationError::AlreadyExists,
        Some(libc::ENOENT | libc::ENODEV | libc::ENXIO | libc::ESRCH | libc::EADDRNOTAVAIL) => {
            MutationError::AlreadyAbsent
        }
        _ => MutationError::Other,
    }
}

/// Interface lookup and lifecycle.
pub trait LinkOps {
    /// Look up an interface by name. `Ok(None)` when it does not exist.
    fn link_by_name(&self, name: &str) -> netlink::Result<Option<Link>>;

    fn add_dummy(&self, name: &str) -> netlink::Result<()>;

    /// Create an xfrm interface on top of `parent_index`.
    fn add_xfrm(&self, name: &str, parent_index: u32, if_id: u32) -> netlink::Result<()>;

    fn set_link_up(&self, index: u32) -> netlink::Result<()>;

    fn delete_link(&self, index: u32) -> netlink::Result<()>;
}

/// Host-prefix address management.
pub trait AddressOps {
    /// Assign `addr` as a /32 or /128 to the interface.
    fn add_address(&self, index: u32, addr: IpAddr) -> netlink::Result<()>;

    fn delete_address(&self, index: u32, addr: IpAddr) -> netlink::Result<()>;

    /// Addresses of both families assigned to the interface.
    fn list_addresses(&self, index: u32) -> netlink::Result<Vec<IpAddr>>;
}

/// Route management.
pub trait RouteOps {
    fn add_route(&self, route: &Route) -> netlink::Result<()>;

    fn delete_route(&self, route: &Route) -> netlink::Result<()>;

    fn list_routes(&self, filter: &RouteFilter) -> netlink::Result<Vec<Route>>;
}

/// Every kernel capability the reconciler needs.
pub trait Kernel: LinkOps + AddressOps + RouteOps {}

impl<T: LinkOps + AddressOps + RouteOps> Kernel for T {}

fn host_prefix(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

impl LinkOps for Connection {
    fn link_by_name(&self, name: &str) -> netlink::Result<Option<Link>> {
        Ok(self.get_link_by_name(name)?.map(Link::from))
    }

    fn add_dummy(&self, name: &str) -> netlink::Result<()> {
        self.add_link(DummyLink::new(name))
    }

    fn add_xfrm(&self, name: &str, parent_index: u32, if_id: u32) -> netlink::Result<()> {
        self.add_link(XfrmLink::new(name, parent_index, if_id))
    }

    fn set_link_up(&self, index: u32) -> netlink::Result<()> {
        Connection::set_link_up(self, index)
    }

    fn delete_link(&self, index: u32) -> netlink::Result<()> {
        self.del_link(index)
    }
}

impl AddressOps for Connection {
    fn add_address(&self, index: u32, addr: IpAddr) -> netlink::Result<()> {
        Connection::add_address(self, index, addr, host_prefix(&addr))
    }

    fn delete_address(&self, index: u32, addr: IpAddr) -> netlink::Result<()> {
        self.del_address(index, addr, host_prefix(&addr))
    }

    fn list_addresses(&self, index: u32) -> netlink::Result<Vec<IpAddr>> {
        Ok(self
            .get_addresses_by_index(index)?
            .iter()
            .filter_map(|a| a.primary_address())
            .collect())
    }
}

impl RouteOps for Connection {
    fn add_route(&self, route: &Route) -> netlink::Result<()> {
        Connection::add_route(self, &route.destination, route.index, route.scope)
    }

    fn delete_route(&self, route: &Route) -> netlink::Result<()> {
        self.del_route(&route.destination, route.index, route.scope)
    }

    fn list_routes(&self, filter: &RouteFilter) -> netlink::Result<Vec<Route>> {
        Ok(self
            .get_routes()?
            .iter()
            .filter_map(Route::from_message)
            .filter(|r| filter.matches(r))
            .collect())
    }
}
