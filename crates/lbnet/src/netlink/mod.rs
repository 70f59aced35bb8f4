//! Blocking rtnetlink client.
//!
//! Just enough of NETLINK_ROUTE to look up links, create and delete dummy
//! and xfrm interfaces, manage addresses and manage device routes.
//!
//! # Quick Start
//!
//! ```ignore
//! use lbnet::netlink::Connection;
//!
//! let conn = Connection::new()?;
//!
//! for link in conn.get_links()? {
//!     println!("{}: {}", link.ifindex(), link.name().unwrap_or("?"));
//! }
//!
//! // Same thing inside a named namespace
//! let conn = Connection::for_namespace("blue")?;
//! ```

pub mod addr;
pub mod attr;
mod builder;
pub mod connection;
mod error;
pub mod link;
pub mod message;
pub mod messages;
pub mod route;
mod socket;
pub mod types;

pub use attr::{AttrIter, NlAttr};
pub use builder::{MessageBuilder, NestToken};
pub use connection::Connection;
pub use error::{Error, Result};
pub use message::{MessageIter, NLMSG_HDRLEN, NlMsgHdr, NlMsgType};
pub use messages::{AddressMessage, FromNetlink, LinkMessage, RouteMessage};
pub use socket::NetlinkSocket;
pub use types::{RouteProtocol, RouteScope, RouteType};
