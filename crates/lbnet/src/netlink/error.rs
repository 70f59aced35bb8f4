//! Error types for the rtnetlink transport.

use std::io;

/// Result type for netlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while talking to the kernel over rtnetlink.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// `NLMSG_ERROR` with a non-zero code. `errno` is positive.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel { errno: i32, message: String },

    /// Like [`Error::Kernel`], naming the request that failed.
    #[error("{operation}: {message} (errno {errno})")]
    KernelWithContext {
        operation: String,
        errno: i32,
        message: String,
    },

    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("parse error: {0}")]
    Parse(String),

    /// No namespace file at the given name or path.
    #[error("namespace not found: {name}")]
    NamespaceNotFound { name: String },
}

impl Error {
    /// Build from the errno of an `NLMSG_ERROR` payload. The kernel sends
    /// it negated; either sign is accepted.
    pub fn from_errno(errno: i32) -> Self {
        let errno = errno.abs();
        Self::Kernel {
            errno,
            message: io::Error::from_raw_os_error(errno).to_string(),
        }
    }

    /// Attach the failed operation to a kernel error. Other variants pass
    /// through untouched.
    pub fn with_context(self, operation: impl Into<String>) -> Self {
        match self {
            Self::Kernel { errno, message } => Self::KernelWithContext {
                operation: operation.into(),
                errno,
                message,
            },
            other => other,
        }
    }

    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } | Self::KernelWithContext { errno, .. } => Some(*errno),
            _ => None,
        }
    }

    /// ENOENT, ENODEV or a missing namespace.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NamespaceNotFound { .. })
            || matches!(self.errno(), Some(libc::ENOENT | libc::ENODEV))
    }

    pub fn is_already_exists(&self) -> bool {
        self.errno() == Some(libc::EEXIST)
    }

    /// EPERM or EACCES, usually a missing CAP_NET_ADMIN.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self.errno(), Some(libc::EPERM | libc::EACCES))
    }
}
