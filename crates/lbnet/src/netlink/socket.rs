//! Blocking NETLINK_ROUTE socket.

use std::fs::File;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use bytes::BytesMut;
use netlink_sys::{Socket, SocketAddr, protocols};

use super::error::{Error, Result};

/// Receive buffer size for a single datagram.
const RECV_BUF_SIZE: usize = 32768;

/// Blocking rtnetlink socket.
pub struct NetlinkSocket {
    socket: Socket,
    /// Sequence number counter.
    seq: AtomicU32,
    /// Local port ID (assigned by kernel).
    pid: u32,
}

impl NetlinkSocket {
    /// Create a socket in the calling thread's network namespace.
    pub fn new() -> Result<Self> {
        let mut socket = Socket::new(protocols::NETLINK_ROUTE)?;

        let mut addr = SocketAddr::new(0, 0);
        socket.bind(&addr)?;
        socket.get_address(&mut addr)?;
        let pid = addr.port_number();

        // Extended ACK is best effort; older kernels reject it.
        socket.set_ext_ack(true).ok();

        Ok(Self {
            socket,
            seq: AtomicU32::new(1),
            pid,
        })
    }

    /// Create a socket bound to the network namespace behind `ns_fd`.
    ///
    /// The calling thread enters the namespace only for the duration of
    /// socket creation; the socket keeps operating in that namespace after
    /// the thread switches back.
    pub fn new_in_namespace(ns_fd: RawFd) -> Result<Self> {
        let current_ns = File::open("/proc/self/ns/net")?;

        // SAFETY: ns_fd refers to an open namespace file owned by the caller.
        if unsafe { libc::setns(ns_fd, libc::CLONE_NEWNET) } < 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }

        let result = Self::new();

        // SAFETY: current_ns was opened from /proc/self/ns/net above and is still open.
        if unsafe { libc::setns(current_ns.as_raw_fd(), libc::CLONE_NEWNET) } < 0 {
            tracing::warn!(
                error = %std::io::Error::last_os_error(),
                "failed to restore original network namespace"
            );
        }

        result
    }

    /// Create a socket in the network namespace at `ns_path`
    /// (e.g. `/var/run/netns/blue` or `/proc/1234/ns/net`).
    pub fn new_in_namespace_path<P: AsRef<Path>>(ns_path: P) -> Result<Self> {
        let ns_path = ns_path.as_ref();
        let ns_file = File::open(ns_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NamespaceNotFound {
                name: ns_path.display().to_string(),
            },
            _ => Error::Io(e),
        })?;
        Self::new_in_namespace(ns_file.as_raw_fd())
    }

    /// Get the next sequence number.
    pub fn next_seq(&self) -> u32 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Get the local port ID.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Send one request datagram.
    pub fn send(&self, msg: &[u8]) -> Result<()> {
        self.socket.send(msg, 0)?;
        Ok(())
    }

    /// Block until the next datagram arrives.
    pub fn recv_msg(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::with_capacity(RECV_BUF_SIZE);
        self.socket.recv(&mut buf, 0)?;
        Ok(buf.to_vec())
    }
}

impl AsRawFd for NetlinkSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }
}
