//! Binding service addresses to interfaces.

use std::net::IpAddr;

use crate::error::{Error, Result};
use crate::kernel::{AddressOps, Link, LinkOps, MutationError, classify_mutation_error};

/// Resolve `name` to a link, failing with [`Error::InterfaceNotFound`].
pub(crate) fn resolve<K: LinkOps>(kernel: &K, name: &str) -> Result<Link> {
    kernel
        .link_by_name(name)
        .map_err(|e| Error::kernel(format!("look up interface {name}"), e))?
        .ok_or_else(|| Error::InterfaceNotFound {
            name: name.to_owned(),
        })
}

pub(crate) fn parse_address(address: &str) -> Result<IpAddr> {
    address.parse().map_err(|_| Error::InvalidAddress {
        address: address.to_owned(),
    })
}

/// Binds and unbinds host-prefix addresses (/32, /128).
pub struct AddressBinder<'a, K> {
    kernel: &'a K,
}

impl<'a, K: LinkOps + AddressOps> AddressBinder<'a, K> {
    pub fn new(kernel: &'a K) -> Self {
        Self { kernel }
    }

    /// Bind `address` to `device`.
    ///
    /// Returns `true` if the address was already bound.
    pub fn ensure_address_bind(&self, address: &str, device: &str) -> Result<bool> {
        let link = resolve(self.kernel, device)?;
        let addr = parse_address(address)?;

        tracing::debug!(%addr, device, "binding address");
        match self.kernel.add_address(link.index, addr) {
            Ok(()) => Ok(false),
            Err(e) if classify_mutation_error(&e) == MutationError::AlreadyExists => {
                tracing::debug!(%addr, device, "address already bound");
                Ok(true)
            }
            Err(e) => Err(Error::kernel(
                format!("bind address {addr} to interface {device}"),
                e,
            )),
        }
    }

    /// Remove `address` from `device`. Not bound is success.
    pub fn unbind_address(&self, address: &str, device: &str) -> Result<()> {
        let link = resolve(self.kernel, device)?;
        let addr = parse_address(address)?;

        tracing::debug!(%addr, device, "unbinding address");
        match self.kernel.delete_address(link.index, addr) {
            Ok(()) => Ok(()),
            Err(e) if classify_mutation_error(&e) == MutationError::AlreadyAbsent => {
                tracing::debug!(%addr, device, "address already unbound");
                Ok(())
            }
            Err(e) => Err(Error::kernel(
                format!("unbind address {addr} from interface {device}"),
                e,
            )),
        }
    }

    /// All addresses of either family bound to `device`.
    pub fn list_bound_addresses(&self, device: &str) -> Result<Vec<IpAddr>> {
        let link = resolve(self.kernel, device)?;
        self.kernel
            .list_addresses(link.index)
            .map_err(|e| Error::kernel(format!("list addresses of interface {device}"), e))
    }
}
