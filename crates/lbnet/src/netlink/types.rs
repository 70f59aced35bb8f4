//! Fixed rtnetlink family headers and attribute identifiers.

use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::error::Result;
use super::message::ref_prefix;

// ============================================================================
// Links
// ============================================================================

/// Interface info message (struct ifinfomsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfInfoMsg {
    pub ifi_family: u8,
    pub __ifi_pad: u8,
    pub ifi_type: u16,
    pub ifi_index: i32,
    pub ifi_flags: u32,
    pub ifi_change: u32,
}

impl IfInfoMsg {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.ifi_index = index as i32;
        self
    }

    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        ref_prefix(data)
    }
}

/// IFLA_* attribute ids.
pub mod ifla {
    pub const IFNAME: u16 = 3;
    pub const LINKINFO: u16 = 18;
}

/// IFLA_INFO_* attribute ids (nested in IFLA_LINKINFO).
pub mod ifla_info {
    pub const KIND: u16 = 1;
    pub const DATA: u16 = 2;
}

/// IFLA_XFRM_* attribute ids (nested in IFLA_INFO_DATA for kind "xfrm").
pub mod ifla_xfrm {
    pub const LINK: u16 = 1;
    pub const IF_ID: u16 = 2;
}

pub const IFF_UP: u32 = libc::IFF_UP as u32;

// ============================================================================
// Addresses
// ============================================================================

/// Interface address message (struct ifaddrmsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfAddrMsg {
    pub ifa_family: u8,
    pub ifa_prefixlen: u8,
    pub ifa_flags: u8,
    pub ifa_scope: u8,
    pub ifa_index: u32,
}

impl IfAddrMsg {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        ref_prefix(data)
    }
}

/// IFA_* attribute ids.
pub mod ifa {
    pub const ADDRESS: u16 = 1;
    pub const LOCAL: u16 = 2;
}

// ============================================================================
// Routes
// ============================================================================

/// Route message (struct rtmsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct RtMsg {
    pub rtm_family: u8,
    pub rtm_dst_len: u8,
    pub rtm_src_len: u8,
    pub rtm_tos: u8,
    pub rtm_table: u8,
    pub rtm_protocol: u8,
    pub rtm_scope: u8,
    pub rtm_type: u8,
    pub rtm_flags: u32,
}

impl RtMsg {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        ref_prefix(data)
    }
}

/// RTA_* attribute ids.
pub mod rta {
    pub const DST: u16 = 1;
    pub const OIF: u16 = 4;
    pub const PREFSRC: u16 = 7;
    pub const TABLE: u16 = 15;
}

/// Well-known routing table ids.
pub mod rt_table {
    pub const UNSPEC: u32 = 0;
    pub const MAIN: u32 = 254;
    pub const LOCAL: u32 = 255;
}

/// Route scope (rtm_scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RouteScope {
    Universe,
    Site,
    Link,
    Host,
    Nowhere,
    Other(u8),
}

impl From<u8> for RouteScope {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::Universe,
            200 => Self::Site,
            253 => Self::Link,
            254 => Self::Host,
            255 => Self::Nowhere,
            other => Self::Other(other),
        }
    }
}

impl From<RouteScope> for u8 {
    fn from(scope: RouteScope) -> Self {
        match scope {
            RouteScope::Universe => 0,
            RouteScope::Site => 200,
            RouteScope::Link => 253,
            RouteScope::Host => 254,
            RouteScope::Nowhere => 255,
            RouteScope::Other(v) => v,
        }
    }
}

impl fmt::Display for RouteScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Universe => f.write_str("global"),
            Self::Site => f.write_str("site"),
            Self::Link => f.write_str("link"),
            Self::Host => f.write_str("host"),
            Self::Nowhere => f.write_str("nowhere"),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

/// Route type (rtm_type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RouteType {
    Unspec,
    Unicast,
    Local,
    Broadcast,
    Anycast,
    Multicast,
    Other(u8),
}

impl From<u8> for RouteType {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::Unspec,
            1 => Self::Unicast,
            2 => Self::Local,
            3 => Self::Broadcast,
            4 => Self::Anycast,
            5 => Self::Multicast,
            other => Self::Other(other),
        }
    }
}

impl From<RouteType> for u8 {
    fn from(kind: RouteType) -> Self {
        match kind {
            RouteType::Unspec => 0,
            RouteType::Unicast => 1,
            RouteType::Local => 2,
            RouteType::Broadcast => 3,
            RouteType::Anycast => 4,
            RouteType::Multicast => 5,
            RouteType::Other(v) => v,
        }
    }
}

/// Route protocol (rtm_protocol): who installed the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RouteProtocol {
    Unspec,
    Redirect,
    Kernel,
    Boot,
    Static,
    Other(u8),
}

impl From<u8> for RouteProtocol {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::Unspec,
            1 => Self::Redirect,
            2 => Self::Kernel,
            3 => Self::Boot,
            4 => Self::Static,
            other => Self::Other(other),
        }
    }
}

impl From<RouteProtocol> for u8 {
    fn from(proto: RouteProtocol) -> Self {
        match proto {
            RouteProtocol::Unspec => 0,
            RouteProtocol::Redirect => 1,
            RouteProtocol::Kernel => 2,
            RouteProtocol::Boot => 3,
            RouteProtocol::Static => 4,
            RouteProtocol::Other(v) => v,
        }
    }
}
