//! lbnetctl command implementations.

pub mod address;
pub mod device;
pub mod local;
pub mod route;

use lbnet::NetlinkHandle;
use lbnet::netlink::Connection;

/// Handle every command runs against.
pub type Handle = NetlinkHandle<Connection>;
