//! Idempotent kernel network reconciliation for load-balancer data planes.
//!
//! A host-local load-balancing controller declares what should exist (a
//! service address bound to a dummy device, a route to a service subnet, an
//! xfrm interface for encrypted traffic) and this crate makes the kernel
//! converge on it. Every mutating operation treats "already in the desired
//! state" as success, so a reconcile loop can call it on every pass.
//!
//! # Components
//!
//! - [`device::DeviceManager`] - dummy and xfrm interface lifecycle
//! - [`address::AddressBinder`] - bind/unbind host addresses
//! - [`route::RouteManager`] - link-scope device routes
//! - [`local::LocalAddressScanner`] - addresses owned by this host
//! - [`default_route::DefaultRouteInspector`] - interface of the default route
//!
//! All of them are generic over the [`kernel`] capability traits;
//! [`netlink::Connection`] implements those against a live kernel.
//!
//! # Features
//!
//! - `serde` - `Serialize`/`Deserialize` for [`HandleConfig`] and the view types
//! - `lab` - root-only integration tests in throwaway namespaces
//!
//! # Example
//!
//! ```ignore
//! use lbnet::{HandleConfig, NetlinkHandle};
//!
//! let handle = NetlinkHandle::connect(HandleConfig::new())?;
//!
//! handle.ensure_dummy_device("kube-ipvs0")?;
//! let already_bound = handle.ensure_address_bind("10.96.0.10", "kube-ipvs0")?;
//! handle.ensure_route_add("10.96.0.0/12", "kube-ipvs0")?;
//!
//! for addr in handle.get_local_addresses(None, Some("kube-ipvs0"))? {
//!     println!("{addr}");
//! }
//! ```

pub mod address;
pub mod default_route;
pub mod device;
pub mod error;
pub mod handle;
pub mod kernel;
pub mod local;
pub mod netlink;
pub mod route;

#[cfg(test)]
mod fixtures;

pub use default_route::{CommandRunner, SystemCommandRunner};
pub use error::{Error, Result};
pub use handle::{HandleConfig, NetlinkHandle};
pub use kernel::{Link, LinkKind, Route};
pub use local::LocalAddressStrategy;
