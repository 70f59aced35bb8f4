//! Route add/delete/list.

use std::net::IpAddr;

use ipnet::IpNet;

use super::builder::MessageBuilder;
use super::connection::{Connection, ack_request, create_request};
use super::error::Result;
use super::message::NlMsgType;
use super::messages::RouteMessage;
use super::types::{RouteProtocol, RouteScope, RouteType, RtMsg, rt_table, rta};

/// Fill in rtmsg + RTA_DST/RTA_OIF for a device route in the main table.
///
/// On delete requests `protocol` and `kind` are `Unspec`, which the kernel
/// treats as wildcards.
fn write_route(
    builder: &mut MessageBuilder,
    dst: &IpNet,
    oif: u32,
    scope: RouteScope,
    protocol: RouteProtocol,
    kind: RouteType,
) {
    let family = match dst {
        IpNet::V4(_) => libc::AF_INET as u8,
        IpNet::V6(_) => libc::AF_INET6 as u8,
    };

    let header = RtMsg {
        rtm_family: family,
        rtm_dst_len: dst.prefix_len(),
        rtm_table: rt_table::MAIN as u8,
        rtm_protocol: protocol.into(),
        rtm_scope: scope.into(),
        rtm_type: kind.into(),
        ..RtMsg::new()
    };
    builder.append(&header);

    let octets = match dst.network() {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    };
    builder.append_attr(rta::DST, &octets);
    builder.append_attr_u32(rta::OIF, oif);
}

impl Connection {
    /// Add a device route. Fails with `EEXIST` if it is already present.
    pub fn add_route(&self, dst: &IpNet, oif: u32, scope: RouteScope) -> Result<()> {
        let mut builder = create_request(NlMsgType::RTM_NEWROUTE);
        write_route(
            &mut builder,
            dst,
            oif,
            scope,
            RouteProtocol::Boot,
            RouteType::Unicast,
        );
        self.request_ack(builder)
    }

    /// Delete a device route. Fails with `ESRCH` if it does not exist.
    pub fn del_route(&self, dst: &IpNet, oif: u32, scope: RouteScope) -> Result<()> {
        let mut builder = ack_request(NlMsgType::RTM_DELROUTE);
        write_route(
            &mut builder,
            dst,
            oif,
            scope,
            RouteProtocol::Unspec,
            RouteType::Unspec,
        );
        self.request_ack(builder)
    }

    /// Dump routes of every family from every table.
    pub fn get_routes(&self) -> Result<Vec<RouteMessage>> {
        self.dump_typed(NlMsgType::RTM_GETROUTE)
    }
}
