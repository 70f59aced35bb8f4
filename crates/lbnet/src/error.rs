//! Error taxonomy for reconciliation operations.

use std::io;

use crate::kernel::LinkKind;
use crate::netlink;

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the reconciliation layer.
///
/// Every variant names the resource involved so an operator can correlate
/// a failure with the object the reconcile loop was converging.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The referenced interface does not exist.
    #[error("interface not found: {name}")]
    InterfaceNotFound {
        /// The interface name that was looked up.
        name: String,
    },

    /// An interface exists but has the wrong kind for the requested delete.
    #[error("expected {expected} device {name}, got device type: {actual}")]
    KindMismatch {
        name: String,
        expected: LinkKind,
        actual: LinkKind,
    },

    /// Caller supplied an unparseable IP literal.
    #[error("invalid IP address: {address}")]
    InvalidAddress { address: String },

    /// Caller supplied an unparseable CIDR subnet.
    #[error("invalid CIDR subnet {subnet}: {reason}")]
    InvalidSubnet { subnet: String, reason: String },

    /// The route-listing command could not be located.
    #[error("failed to look up path of {command}: {source}")]
    CommandUnavailable {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The route-listing command could not run or exited unsuccessfully.
    #[error("{command} failed: {reason}")]
    CommandFailed {
        command: String,
        reason: String,
        /// Combined stdout/stderr captured before the failure.
        output: String,
    },

    /// No `default via` line in the route listing.
    #[error("outgoing interface of default route not found")]
    DefaultRouteNotFound,

    /// A `default via` line without a device field.
    #[error("cannot parse default route: {line:?}")]
    UnparseableRoute { line: String },

    /// Any other kernel failure, wrapped with the operation and its targets.
    #[error("{operation}: {source}")]
    Kernel {
        operation: String,
        #[source]
        source: netlink::Error,
    },
}

impl Error {
    pub(crate) fn kernel(operation: impl Into<String>, source: netlink::Error) -> Self {
        Self::Kernel {
            operation: operation.into(),
            source,
        }
    }

    /// Whether the failure means a referenced object is missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::InterfaceNotFound { .. } | Self::DefaultRouteNotFound => true,
            Self::Kernel { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Whether the failure is the caller's fault (bad input), as opposed to
    /// kernel or environment state.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidAddress { .. } | Self::InvalidSubnet { .. }
        )
    }
}
