//! Dummy and xfrm interface lifecycle.

use crate::error::{Error, Result};
use crate::kernel::{Link, LinkKind, LinkOps, MutationError, classify_mutation_error};

/// Name of the loopback device xfrm interfaces are parented to.
const LOOPBACK: &str = "lo";

/// Ensures virtual interfaces exist (or not) with the expected kind.
pub struct DeviceManager<'a, K> {
    kernel: &'a K,
}

impl<'a, K: LinkOps> DeviceManager<'a, K> {
    pub fn new(kernel: &'a K) -> Self {
        Self { kernel }
    }

    fn lookup(&self, name: &str) -> Result<Option<Link>> {
        self.kernel
            .link_by_name(name)
            .map_err(|e| Error::kernel(format!("look up interface {name}"), e))
    }

    /// Make sure a dummy interface named `name` exists.
    ///
    /// Returns `true` if an interface with that name was already present.
    /// Its kind is not checked.
    pub fn ensure_dummy_device(&self, name: &str) -> Result<bool> {
        if self.lookup(name)?.is_some() {
            tracing::debug!(device = name, "dummy device already exists");
            return Ok(true);
        }

        tracing::debug!(device = name, "creating dummy device");
        self.kernel
            .add_dummy(name)
            .map_err(|e| Error::kernel(format!("create dummy device {name}"), e))?;
        Ok(false)
    }

    /// Remove the dummy interface `name`. Absent is success; an interface
    /// of another kind is left alone and reported.
    pub fn delete_dummy_device(&self, name: &str) -> Result<()> {
        self.delete_of_kind(name, LinkKind::Dummy)
    }

    /// Make sure an xfrm interface named `name` exists and is up.
    ///
    /// A new interface is parented to loopback. If loopback cannot be
    /// resolved, whether absent or the lookup fails, nothing is created and
    /// the call still succeeds.
    pub fn ensure_xfrm_interface(&self, name: &str, if_id: u32) -> Result<()> {
        if let Some(link) = self.lookup(name)? {
            tracing::debug!(device = name, "xfrm interface already exists");
            return self.set_up(&link);
        }

        let lo = match self.lookup(LOOPBACK) {
            Ok(Some(lo)) => lo,
            Ok(None) => {
                tracing::warn!(
                    device = name,
                    if_id,
                    "loopback not found, skipping xfrm interface creation"
                );
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(
                    device = name,
                    if_id,
                    error = %e,
                    "loopback lookup failed, skipping xfrm interface creation"
                );
                return Ok(());
            }
        };

        tracing::debug!(device = name, if_id, parent = lo.index, "creating xfrm interface");
        self.kernel
            .add_xfrm(name, lo.index, if_id)
            .map_err(|e| Error::kernel(format!("create xfrm interface {name}"), e))?;

        let link = self.lookup(name)?.ok_or_else(|| Error::InterfaceNotFound {
            name: name.to_owned(),
        })?;
        self.set_up(&link)
    }

    /// Remove the xfrm interface `name`. Same rules as
    /// [`delete_dummy_device`](Self::delete_dummy_device).
    pub fn delete_xfrm_interface(&self, name: &str) -> Result<()> {
        self.delete_of_kind(name, LinkKind::Xfrm)
    }

    fn set_up(&self, link: &Link) -> Result<()> {
        self.kernel
            .set_link_up(link.index)
            .map_err(|e| Error::kernel(format!("set interface {} up", link.name), e))
    }

    fn delete_of_kind(&self, name: &str, expected: LinkKind) -> Result<()> {
        let Some(link) = self.lookup(name)? else {
            tracing::debug!(device = name, "{expected} device already absent");
            return Ok(());
        };

        if link.kind != expected {
            return Err(Error::KindMismatch {
                name: name.to_owned(),
                expected,
                actual: link.kind,
            });
        }

        tracing::debug!(device = name, index = link.index, "deleting {expected} device");
        match self.kernel.delete_link(link.index) {
            Ok(()) => Ok(()),
            Err(e) if classify_mutation_error(&e) == MutationError::AlreadyAbsent => {
                tracing::debug!(device = name, "{expected} device removed concurrently");
                Ok(())
            }
            Err(e) => Err(Error::kernel(format!("delete {expected} device {name}"), e)),
        }
    }
}
