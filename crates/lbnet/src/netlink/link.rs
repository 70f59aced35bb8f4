//! Link creation, lookup and deletion.
//!
//! Only the two virtual link kinds the reconciler manages are modelled:
//!
//! - [`DummyLink`] - dummy interface, an attachment point for service addresses
//! - [`XfrmLink`] - xfrm (IPsec) interface parented to another device
//!
//! # Example
//!
//! ```ignore
//! use lbnet::netlink::Connection;
//! use lbnet::netlink::link::{DummyLink, XfrmLink};
//!
//! let conn = Connection::new()?;
//! conn.add_link(DummyLink::new("kube-ipvs0"))?;
//!
//! let lo = conn.get_link_by_name("lo")?.expect("loopback");
//! conn.add_link(XfrmLink::new("xfrm0", lo.ifindex(), 42))?;
//! ```

use super::builder::MessageBuilder;
use super::connection::{Connection, ack_request, create_request};
use super::error::Result;
use super::message::NlMsgType;
use super::messages::LinkMessage;
use super::types::{IFF_UP, IfInfoMsg, ifla, ifla_info, ifla_xfrm};

/// Link configurations that can be added to the system.
pub trait LinkConfig {
    /// Name of the interface to create.
    fn name(&self) -> &str;

    /// `IFLA_INFO_KIND` for this link type.
    fn kind(&self) -> &str;

    /// Build the RTM_NEWLINK request creating this link.
    fn build(&self) -> MessageBuilder;
}

/// Configuration for a dummy interface.
#[derive(Debug, Clone)]
pub struct DummyLink {
    name: String,
}

impl DummyLink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl LinkConfig for DummyLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "dummy"
    }

    fn build(&self) -> MessageBuilder {
        let mut builder = create_link_message(&self.name);
        let linkinfo = builder.nest_start(ifla::LINKINFO);
        builder.append_attr_str(ifla_info::KIND, self.kind());
        builder.nest_end(linkinfo);
        builder
    }
}

/// Configuration for an xfrm interface.
///
/// Traffic routed into the interface is matched against IPsec policies
/// carrying the same interface id.
#[derive(Debug, Clone)]
pub struct XfrmLink {
    name: String,
    parent_index: u32,
    if_id: u32,
}

impl XfrmLink {
    pub fn new(name: impl Into<String>, parent_index: u32, if_id: u32) -> Self {
        Self {
            name: name.into(),
            parent_index,
            if_id,
        }
    }
}

impl LinkConfig for XfrmLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "xfrm"
    }

    fn build(&self) -> MessageBuilder {
        let mut builder = create_link_message(&self.name);
        let linkinfo = builder.nest_start(ifla::LINKINFO);
        builder.append_attr_str(ifla_info::KIND, self.kind());
        let data = builder.nest_start(ifla_info::DATA);
        builder.append_attr_u32(ifla_xfrm::LINK, self.parent_index);
        builder.append_attr_u32(ifla_xfrm::IF_ID, self.if_id);
        builder.nest_end(data);
        builder.nest_end(linkinfo);
        builder
    }
}

/// Create the base RTM_NEWLINK message with ifinfomsg header and name.
fn create_link_message(name: &str) -> MessageBuilder {
    let mut builder = create_request(NlMsgType::RTM_NEWLINK);
    builder.append(&IfInfoMsg::new());
    builder.append_attr_str(ifla::IFNAME, name);
    builder
}

impl Connection {
    /// Get all network interfaces.
    pub fn get_links(&self) -> Result<Vec<LinkMessage>> {
        self.dump_typed(NlMsgType::RTM_GETLINK)
    }

    /// Get a network interface by name.
    ///
    /// Returns `None` if the interface doesn't exist.
    pub fn get_link_by_name(&self, name: &str) -> Result<Option<LinkMessage>> {
        let links = self.get_links()?;
        Ok(links.into_iter().find(|l| l.name() == Some(name)))
    }

    /// Add a new network interface.
    pub fn add_link<L: LinkConfig>(&self, config: L) -> Result<()> {
        self.request_ack(config.build())
            .map_err(|e| e.with_context(format!("creating {} link {}", config.kind(), config.name())))
    }

    /// Set an interface administratively up. Succeeds if already up.
    pub fn set_link_up(&self, ifindex: u32) -> Result<()> {
        let ifinfo = IfInfoMsg {
            ifi_flags: IFF_UP,
            ifi_change: IFF_UP,
            ..IfInfoMsg::new().with_index(ifindex)
        };

        let mut builder = ack_request(NlMsgType::RTM_NEWLINK);
        builder.append(&ifinfo);
        self.request_ack(builder)
            .map_err(|e| e.with_context(format!("setting link {} up", ifindex)))
    }

    /// Delete an interface by index.
    pub fn del_link(&self, ifindex: u32) -> Result<()> {
        let mut builder = ack_request(NlMsgType::RTM_DELLINK);
        builder.append(&IfInfoMsg::new().with_index(ifindex));
        self.request_ack(builder)
            .map_err(|e| e.with_context(format!("deleting link {}", ifindex)))
    }
}
