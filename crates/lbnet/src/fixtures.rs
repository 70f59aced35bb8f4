//! In-memory kernel for unit tests.
//!
//! Mirrors the errno behaviour of the real kernel closely enough for the
//! components' idempotency logic to be exercised, and records every
//! mutating call so tests can assert that nothing was changed.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use crate::kernel::{AddressOps, Link, LinkKind, LinkOps, Route, RouteFilter, RouteOps};
use crate::netlink::{self, RouteProtocol, RouteScope, RouteType};
use crate::netlink::types::rt_table;

#[derive(Debug, Default)]
struct State {
    links: Vec<Link>,
    up: BTreeSet<u32>,
    /// name -> (parent index, if_id)
    xfrm: BTreeMap<String, (u32, u32)>,
    addresses: BTreeMap<u32, Vec<IpAddr>>,
    routes: Vec<Route>,
    next_index: u32,
    mutations: Vec<String>,
    /// Forced failures, keyed by operation name.
    failures: BTreeMap<&'static str, i32>,
    /// Forced `link_by_name` failures for single names.
    lookup_failures: BTreeMap<String, i32>,
}

#[derive(Debug, Default)]
pub struct FakeKernel {
    state: RefCell<State>,
}

fn errno(errno: i32) -> netlink::Error {
    netlink::Error::from_errno(-errno)
}

impl FakeKernel {
    /// A kernel with only `lo` (index 1).
    pub fn new() -> Self {
        let kernel = Self::default();
        kernel.state.borrow_mut().next_index = 1;
        kernel.with_link("lo", LinkKind::Other(None))
    }

    /// A kernel without a loopback device.
    pub fn without_loopback() -> Self {
        let kernel = Self::default();
        kernel.state.borrow_mut().next_index = 1;
        kernel
    }

    pub fn with_link(self, name: &str, kind: LinkKind) -> Self {
        self.insert_link(name, kind);
        self
    }

    /// Install a kernel-owned local route as the kernel does for every
    /// configured address.
    pub fn with_local_route(self, dst: &str, device: &str, source: Option<&str>) -> Self {
        let index = self.index_of(device).expect("device exists");
        let route = Route {
            scope: RouteScope::Host,
            source: source.map(|s| s.parse().expect("valid source")),
            table: rt_table::LOCAL,
            route_type: RouteType::Local,
            protocol: RouteProtocol::Kernel,
            ..Route::device_route(dst.parse().expect("valid destination"), index)
        };
        self.state.borrow_mut().routes.push(route);
        self
    }

    /// Make the next calls to `operation` fail with `errno`.
    pub fn fail(self, operation: &'static str, errno: i32) -> Self {
        self.state.borrow_mut().failures.insert(operation, errno);
        self
    }

    /// Make lookups of `name` alone fail with `errno`.
    pub fn fail_lookup(self, name: &str, errno: i32) -> Self {
        self.state
            .borrow_mut()
            .lookup_failures
            .insert(name.to_owned(), errno);
        self
    }

    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.state
            .borrow()
            .links
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.index)
    }

    pub fn link(&self, name: &str) -> Option<Link> {
        self.state
            .borrow()
            .links
            .iter()
            .find(|l| l.name == name)
            .cloned()
    }

    pub fn link_count(&self) -> usize {
        self.state.borrow().links.len()
    }

    pub fn is_up(&self, name: &str) -> bool {
        self.index_of(name)
            .is_some_and(|index| self.state.borrow().up.contains(&index))
    }

    pub fn xfrm_params(&self, name: &str) -> Option<(u32, u32)> {
        self.state.borrow().xfrm.get(name).copied()
    }

    pub fn addresses(&self, device: &str) -> Vec<IpAddr> {
        self.index_of(device)
            .and_then(|index| self.state.borrow().addresses.get(&index).cloned())
            .unwrap_or_default()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.state.borrow().routes.clone()
    }

    /// Mutating calls that reached the kernel, in order.
    pub fn mutations(&self) -> Vec<String> {
        self.state.borrow().mutations.clone()
    }

    fn insert_link(&self, name: &str, kind: LinkKind) -> u32 {
        let mut state = self.state.borrow_mut();
        let index = state.next_index;
        state.next_index += 1;
        state.links.push(Link {
            name: name.to_owned(),
            index,
            kind,
        });
        index
    }

    /// Record a mutation and apply any forced failure for it.
    fn mutate(&self, operation: &'static str, detail: String) -> netlink::Result<()> {
        let mut state = self.state.borrow_mut();
        state.mutations.push(format!("{operation} {detail}"));
        match state.failures.get(operation) {
            Some(&e) => Err(errno(e)),
            None => Ok(()),
        }
    }

    fn has_index(&self, index: u32) -> bool {
        self.state.borrow().links.iter().any(|l| l.index == index)
    }
}

impl LinkOps for FakeKernel {
    fn link_by_name(&self, name: &str) -> netlink::Result<Option<Link>> {
        let state = self.state.borrow();
        if let Some(&e) = state
            .failures
            .get("link_by_name")
            .or_else(|| state.lookup_failures.get(name))
        {
            return Err(errno(e));
        }
        drop(state);
        Ok(self.link(name))
    }

    fn add_dummy(&self, name: &str) -> netlink::Result<()> {
        self.mutate("add_dummy", name.to_owned())?;
        if self.index_of(name).is_some() {
            return Err(errno(libc::EEXIST));
        }
        self.insert_link(name, LinkKind::Dummy);
        Ok(())
    }

    fn add_xfrm(&self, name: &str, parent_index: u32, if_id: u32) -> netlink::Result<()> {
        self.mutate("add_xfrm", format!("{name} {parent_index} {if_id}"))?;
        if self.index_of(name).is_some() {
            return Err(errno(libc::EEXIST));
        }
        if !self.has_index(parent_index) {
            return Err(errno(libc::ENODEV));
        }
        self.insert_link(name, LinkKind::Xfrm);
        self.state
            .borrow_mut()
            .xfrm
            .insert(name.to_owned(), (parent_index, if_id));
        Ok(())
    }

    fn set_link_up(&self, index: u32) -> netlink::Result<()> {
        self.mutate("set_link_up", index.to_string())?;
        if !self.has_index(index) {
            return Err(errno(libc::ENODEV));
        }
        self.state.borrow_mut().up.insert(index);
        Ok(())
    }

    fn delete_link(&self, index: u32) -> netlink::Result<()> {
        self.mutate("delete_link", index.to_string())?;
        if !self.has_index(index) {
            return Err(errno(libc::ENODEV));
        }
        let mut state = self.state.borrow_mut();
        if let Some(pos) = state.links.iter().position(|l| l.index == index) {
            let link = state.links.remove(pos);
            state.xfrm.remove(&link.name);
        }
        state.up.remove(&index);
        state.addresses.remove(&index);
        state.routes.retain(|r| r.index != index);
        Ok(())
    }
}

impl AddressOps for FakeKernel {
    fn add_address(&self, index: u32, addr: IpAddr) -> netlink::Result<()> {
        self.mutate("add_address", format!("{index} {addr}"))?;
        if !self.has_index(index) {
            return Err(errno(libc::ENODEV));
        }
        let mut state = self.state.borrow_mut();
        let bound = state.addresses.entry(index).or_default();
        if bound.contains(&addr) {
            return Err(errno(libc::EEXIST));
        }
        bound.push(addr);
        Ok(())
    }

    fn delete_address(&self, index: u32, addr: IpAddr) -> netlink::Result<()> {
        self.mutate("delete_address", format!("{index} {addr}"))?;
        if !self.has_index(index) {
            return Err(errno(libc::ENODEV));
        }
        let mut state = self.state.borrow_mut();
        let bound = state.addresses.entry(index).or_default();
        match bound.iter().position(|a| *a == addr) {
            Some(pos) => {
                bound.remove(pos);
                Ok(())
            }
            None => Err(errno(libc::EADDRNOTAVAIL)),
        }
    }

    fn list_addresses(&self, index: u32) -> netlink::Result<Vec<IpAddr>> {
        Ok(self
            .state
            .borrow()
            .addresses
            .get(&index)
            .cloned()
            .unwrap_or_default())
    }
}

impl RouteOps for FakeKernel {
    fn add_route(&self, route: &Route) -> netlink::Result<()> {
        self.mutate("add_route", format!("{} {}", route.destination, route.index))?;
        if !self.has_index(route.index) {
            return Err(errno(libc::ENODEV));
        }
        let mut state = self.state.borrow_mut();
        if state
            .routes
            .iter()
            .any(|r| r.destination == route.destination && r.table == route.table)
        {
            return Err(errno(libc::EEXIST));
        }
        state.routes.push(route.clone());
        Ok(())
    }

    fn delete_route(&self, route: &Route) -> netlink::Result<()> {
        self.mutate("delete_route", format!("{} {}", route.destination, route.index))?;
        let mut state = self.state.borrow_mut();
        let pos = state.routes.iter().position(|r| {
            r.destination == route.destination && r.index == route.index && r.table == route.table
        });
        match pos {
            Some(pos) => {
                state.routes.remove(pos);
                Ok(())
            }
            None => Err(errno(libc::ESRCH)),
        }
    }

    fn list_routes(&self, filter: &RouteFilter) -> netlink::Result<Vec<Route>> {
        Ok(self
            .state
            .borrow()
            .routes
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }
}
