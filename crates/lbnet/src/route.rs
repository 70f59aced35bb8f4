//! Device routes for service subnets.

use ipnet::IpNet;

use crate::address::resolve;
use crate::error::{Error, Result};
use crate::kernel::{LinkOps, MutationError, Route, RouteOps, classify_mutation_error};

pub(crate) fn parse_subnet(subnet: &str) -> Result<IpNet> {
    subnet
        .parse::<IpNet>()
        .map(|net| net.trunc())
        .map_err(|e| Error::InvalidSubnet {
            subnet: subnet.to_owned(),
            reason: e.to_string(),
        })
}

/// Adds and removes link-scope routes in the main table.
pub struct RouteManager<'a, K> {
    kernel: &'a K,
}

impl<'a, K: LinkOps + RouteOps> RouteManager<'a, K> {
    pub fn new(kernel: &'a K) -> Self {
        Self { kernel }
    }

    /// Build the route for `subnet` via `device` without touching the
    /// routing table.
    pub fn get_route(&self, subnet: &str, device: &str) -> Result<Route> {
        let link = resolve(self.kernel, device)?;
        let destination = parse_subnet(subnet)?;
        Ok(Route::device_route(destination, link.index))
    }

    /// Install the route for `subnet` via `device`. Already present is
    /// success.
    pub fn ensure_route_add(&self, subnet: &str, device: &str) -> Result<()> {
        let route = self.get_route(subnet, device)?;

        tracing::debug!(destination = %route.destination, device, "adding route");
        match self.kernel.add_route(&route) {
            Ok(()) => Ok(()),
            Err(e) if classify_mutation_error(&e) == MutationError::AlreadyExists => {
                tracing::debug!(destination = %route.destination, device, "route already exists");
                Ok(())
            }
            Err(e) => Err(Error::kernel(
                format!("add route to {} via interface {device}", route.destination),
                e,
            )),
        }
    }

    /// Remove the route for `subnet` via `device`.
    ///
    /// Unlike the other deletes, a route that does not exist is reported
    /// as an error.
    pub fn delete_route(&self, subnet: &str, device: &str) -> Result<()> {
        let route = self.get_route(subnet, device)?;

        tracing::debug!(destination = %route.destination, device, "deleting route");
        self.kernel.delete_route(&route).map_err(|e| {
            Error::kernel(
                format!("delete route to {} via interface {device}", route.destination),
                e,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FakeKernel;
    use crate::kernel::LinkKind;
    use crate::netlink::RouteScope;

    fn kernel() -> FakeKernel {
        FakeKernel::new().with_link("eth0", LinkKind::Other(None))
    }

    #[test]
    fn test_get_route() {
        let kernel = kernel();
        let routes = RouteManager::new(&kernel);

        let route = routes.get_route("10.1.0.0/16", "eth0").unwrap();
        assert_eq!(route.destination, "10.1.0.0/16".parse::<IpNet>().unwrap());
        assert_eq!(route.scope, RouteScope::Link);
        assert_eq!(route.index, kernel.index_of("eth0").unwrap());
        assert!(route.source.is_none());
    }

    #[test]
    fn test_get_route_masks_host_bits() {
        let kernel = kernel();
        let routes = RouteManager::new(&kernel);

        let route = routes.get_route("10.1.2.3/16", "eth0").unwrap();
        assert_eq!(route.destination.to_string(), "10.1.0.0/16");

        let route = routes.get_route("fd00:10::5/64", "eth0").unwrap();
        assert_eq!(route.destination.to_string(), "fd00:10::/64");
    }

    #[test]
    fn test_get_route_invalid_subnet() {
        let kernel = kernel();
        let routes = RouteManager::new(&kernel);

        let err = routes.get_route("not-a-cidr", "eth0").unwrap_err();
        assert!(err.is_invalid_input());
        assert!(routes.ensure_route_add("not-a-cidr", "eth0").is_err());
        assert!(kernel.mutations().is_empty());
    }

    #[test]
    fn test_get_route_missing_device() {
        let kernel = kernel();
        let routes = RouteManager::new(&kernel);

        assert!(routes.get_route("10.1.0.0/16", "eth9").unwrap_err().is_not_found());
    }

    #[test]
    fn test_ensure_route_add_twice() {
        let kernel = kernel();
        let routes = RouteManager::new(&kernel);

        routes.ensure_route_add("10.1.0.0/16", "eth0").unwrap();
        routes.ensure_route_add("10.1.0.0/16", "eth0").unwrap();
        assert_eq!(kernel.routes().len(), 1);
    }

    #[test]
    fn test_delete_route() {
        let kernel = kernel();
        let routes = RouteManager::new(&kernel);

        routes.ensure_route_add("10.1.0.0/16", "eth0").unwrap();
        routes.delete_route("10.1.0.0/16", "eth0").unwrap();
        assert!(kernel.routes().is_empty());
    }

    #[test]
    fn test_delete_missing_route_is_an_error() {
        let kernel = kernel();
        let routes = RouteManager::new(&kernel);

        let err = routes.delete_route("10.1.0.0/16", "eth0").unwrap_err();
        match err {
            Error::Kernel { source, .. } => assert_eq!(source.errno(), Some(libc::ESRCH)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_add_failure_names_route() {
        let kernel = kernel().fail("add_route", libc::ENETUNREACH);
        let routes = RouteManager::new(&kernel);

        let err = routes.ensure_route_add("10.1.0.0/16", "eth0").unwrap_err();
        assert!(err.to_string().contains("10.1.0.0/16 via interface eth0"));
    }
}
