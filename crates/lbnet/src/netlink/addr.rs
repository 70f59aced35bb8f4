//! IP address add/delete/list.

use std::net::IpAddr;

use super::builder::MessageBuilder;
use super::connection::{Connection, ack_request, create_request};
use super::error::Result;
use super::message::NlMsgType;
use super::messages::AddressMessage;
use super::types::{IfAddrMsg, ifa};

fn family_of(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => libc::AF_INET as u8,
        IpAddr::V6(_) => libc::AF_INET6 as u8,
    }
}

/// Fill in ifaddrmsg + IFA_LOCAL/IFA_ADDRESS for `addr/prefix_len` on `ifindex`.
fn write_address(builder: &mut MessageBuilder, ifindex: u32, addr: &IpAddr, prefix_len: u8) {
    let header = IfAddrMsg {
        ifa_family: family_of(addr),
        ifa_prefixlen: prefix_len,
        ifa_index: ifindex,
        ..IfAddrMsg::new()
    };
    builder.append(&header);

    let octets = match addr {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    };
    builder.append_attr(ifa::LOCAL, &octets);
    builder.append_attr(ifa::ADDRESS, &octets);
}

impl Connection {
    /// Add `addr/prefix_len` to the interface. Fails with `EEXIST` if the
    /// address is already assigned.
    pub fn add_address(&self, ifindex: u32, addr: IpAddr, prefix_len: u8) -> Result<()> {
        let mut builder = create_request(NlMsgType::RTM_NEWADDR);
        write_address(&mut builder, ifindex, &addr, prefix_len);
        self.request_ack(builder)
    }

    /// Remove `addr/prefix_len` from the interface.
    pub fn del_address(&self, ifindex: u32, addr: IpAddr, prefix_len: u8) -> Result<()> {
        let mut builder = ack_request(NlMsgType::RTM_DELADDR);
        write_address(&mut builder, ifindex, &addr, prefix_len);
        self.request_ack(builder)
    }

    /// Get all addresses of both families.
    pub fn get_addresses(&self) -> Result<Vec<AddressMessage>> {
        self.dump_typed(NlMsgType::RTM_GETADDR)
    }

    /// Get the addresses assigned to one interface.
    pub fn get_addresses_by_index(&self, ifindex: u32) -> Result<Vec<AddressMessage>> {
        let addresses = self.get_addresses()?;
        Ok(addresses
            .into_iter()
            .filter(|a| a.ifindex() == ifindex)
            .collect())
    }
}
