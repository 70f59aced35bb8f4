//! Strongly-typed link, address and route messages.
//!
//! Only the attributes this crate acts on are decoded; everything else in
//! a kernel dump is skipped.

use std::net::IpAddr;

use winnow::binary::le_u16;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take;

use super::attr::{AttrIter, get};
use super::error::{Error, Result};
use super::types::{
    IFF_UP, IfAddrMsg, IfInfoMsg, RouteProtocol, RouteScope, RouteType, RtMsg, ifa, ifla,
    ifla_info, rta,
};

/// Parser result used by the message decoders.
pub type PResult<T> = std::result::Result<T, ErrMode<ContextError>>;

fn cut<T>() -> PResult<T> {
    Err(ErrMode::Cut(ContextError::new()))
}

/// Messages that can be decoded from a dump response.
pub trait FromNetlink: Sized {
    /// Write the family header a dump request for this message needs.
    fn write_dump_header(buf: &mut Vec<u8>);

    /// Parse from the payload that follows the netlink header.
    fn parse(input: &mut &[u8]) -> PResult<Self>;

    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut input = data;
        Self::parse(&mut input).map_err(|e| Error::Parse(format!("{:?}", e)))
    }
}

fn take_bytes<'a>(input: &mut &'a [u8], n: usize) -> PResult<&'a [u8]> {
    take(n).parse_next(input)
}

fn u16_le(input: &mut &[u8]) -> PResult<u16> {
    le_u16.parse_next(input)
}

/// Take a fixed-size family header off the front of `input`.
fn parse_header<'a>(input: &mut &'a [u8], size: usize) -> PResult<&'a [u8]> {
    if input.len() < size {
        return cut();
    }
    take_bytes(input, size)
}

/// Read the next attribute from `input`, consuming its alignment padding.
///
/// Returns `None` once the remaining bytes cannot hold another attribute.
fn next_attr<'a>(input: &mut &'a [u8]) -> PResult<Option<(u16, &'a [u8])>> {
    if input.len() < 4 {
        return Ok(None);
    }

    let len = u16_le(input)? as usize;
    let attr_type = u16_le(input)?;

    let payload_len = len.saturating_sub(4);
    if len < 4 || input.len() < payload_len {
        return Ok(None);
    }

    let data = take_bytes(input, payload_len)?;

    let padding = ((len + 3) & !3) - len;
    if input.len() >= padding {
        take_bytes(input, padding)?;
    }

    Ok(Some((attr_type & 0x3FFF, data)))
}

// ============================================================================
// Link
// ============================================================================

/// A network interface as reported by RTM_NEWLINK.
#[derive(Debug, Clone, Default)]
pub struct LinkMessage {
    pub(crate) header: IfInfoMsg,
    pub(crate) name: Option<String>,
    pub(crate) kind: Option<String>,
}

impl LinkMessage {
    pub fn ifindex(&self) -> u32 {
        self.header.ifi_index as u32
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// `IFLA_INFO_KIND` (e.g. "dummy", "xfrm"); `None` for physical and
    /// loopback devices.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn flags(&self) -> u32 {
        self.header.ifi_flags
    }

    pub fn is_up(&self) -> bool {
        self.header.ifi_flags & IFF_UP != 0
    }
}

impl FromNetlink for LinkMessage {
    fn write_dump_header(buf: &mut Vec<u8>) {
        buf.extend_from_slice(zerocopy::IntoBytes::as_bytes(&IfInfoMsg::new()));
    }

    fn parse(input: &mut &[u8]) -> PResult<Self> {
        let header_bytes = parse_header(input, IfInfoMsg::SIZE)?;
        let Ok(header) = IfInfoMsg::from_bytes(header_bytes) else {
            return cut();
        };

        let mut msg = LinkMessage {
            header: *header,
            ..Default::default()
        };

        while let Some((attr_type, data)) = next_attr(input)? {
            match attr_type {
                ifla::IFNAME => {
                    msg.name = get::string(data).ok().map(str::to_owned);
                }
                ifla::LINKINFO => {
                    msg.kind = AttrIter::new(data)
                        .find(|(kind, _)| *kind == ifla_info::KIND)
                        .and_then(|(_, payload)| get::string(payload).ok())
                        .map(str::to_owned);
                }
                _ => {}
            }
        }

        Ok(msg)
    }
}

// ============================================================================
// Address
// ============================================================================

/// An interface address as reported by RTM_NEWADDR.
#[derive(Debug, Clone, Default)]
pub struct AddressMessage {
    pub(crate) header: IfAddrMsg,
    pub(crate) address: Option<IpAddr>,
    pub(crate) local: Option<IpAddr>,
}

impl AddressMessage {
    pub fn ifindex(&self) -> u32 {
        self.header.ifa_index
    }

    pub fn family(&self) -> u8 {
        self.header.ifa_family
    }

    pub fn prefix_len(&self) -> u8 {
        self.header.ifa_prefixlen
    }

    /// The address assigned to the interface.
    ///
    /// `IFA_LOCAL` wins over `IFA_ADDRESS`: on point-to-point links the
    /// latter carries the peer.
    pub fn primary_address(&self) -> Option<IpAddr> {
        self.local.or(self.address)
    }
}

impl FromNetlink for AddressMessage {
    fn write_dump_header(buf: &mut Vec<u8>) {
        buf.extend_from_slice(zerocopy::IntoBytes::as_bytes(&IfAddrMsg::new()));
    }

    fn parse(input: &mut &[u8]) -> PResult<Self> {
        let header_bytes = parse_header(input, IfAddrMsg::SIZE)?;
        let Ok(header) = IfAddrMsg::from_bytes(header_bytes) else {
            return cut();
        };

        let mut msg = AddressMessage {
            header: *header,
            ..Default::default()
        };

        while let Some((attr_type, data)) = next_attr(input)? {
            match attr_type {
                ifa::ADDRESS => msg.address = get::ip_addr(data, header.ifa_family).ok(),
                ifa::LOCAL => msg.local = get::ip_addr(data, header.ifa_family).ok(),
                _ => {}
            }
        }

        Ok(msg)
    }
}

// ============================================================================
// Route
// ============================================================================

/// A route as reported by RTM_NEWROUTE.
#[derive(Debug, Clone, Default)]
pub struct RouteMessage {
    pub(crate) header: RtMsg,
    pub(crate) destination: Option<IpAddr>,
    pub(crate) oif: Option<u32>,
    pub(crate) prefsrc: Option<IpAddr>,
    pub(crate) table: Option<u32>,
}

impl RouteMessage {
    pub fn family(&self) -> u8 {
        self.header.rtm_family
    }

    pub fn dst_len(&self) -> u8 {
        self.header.rtm_dst_len
    }

    pub fn route_type(&self) -> RouteType {
        RouteType::from(self.header.rtm_type)
    }

    pub fn protocol(&self) -> RouteProtocol {
        RouteProtocol::from(self.header.rtm_protocol)
    }

    pub fn scope(&self) -> RouteScope {
        RouteScope::from(self.header.rtm_scope)
    }

    /// Routing table id; `RTA_TABLE` overrides the 8-bit header field.
    pub fn table_id(&self) -> u32 {
        self.table.unwrap_or(self.header.rtm_table as u32)
    }

    pub fn destination(&self) -> Option<&IpAddr> {
        self.destination.as_ref()
    }

    pub fn oif(&self) -> Option<u32> {
        self.oif
    }

    /// Preferred source address (`RTA_PREFSRC`).
    pub fn prefsrc(&self) -> Option<&IpAddr> {
        self.prefsrc.as_ref()
    }
}

impl FromNetlink for RouteMessage {
    fn write_dump_header(buf: &mut Vec<u8>) {
        buf.extend_from_slice(zerocopy::IntoBytes::as_bytes(&RtMsg::new()));
    }

    fn parse(input: &mut &[u8]) -> PResult<Self> {
        let header_bytes = parse_header(input, RtMsg::SIZE)?;
        let Ok(header) = RtMsg::from_bytes(header_bytes) else {
            return cut();
        };

        let mut msg = RouteMessage {
            header: *header,
            ..Default::default()
        };

        while let Some((attr_type, data)) = next_attr(input)? {
            match attr_type {
                rta::DST => msg.destination = get::ip_addr(data, header.rtm_family).ok(),
                rta::PREFSRC => msg.prefsrc = get::ip_addr(data, header.rtm_family).ok(),
                rta::OIF => msg.oif = get::u32_ne(data).ok(),
                rta::TABLE => msg.table = get::u32_ne(data).ok(),
                _ => {}
            }
        }

        Ok(msg)
    }
}
