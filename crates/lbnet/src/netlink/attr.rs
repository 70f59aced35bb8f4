//! Netlink attributes (`struct nlattr`).

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::error::{Error, Result};
use super::message::ref_prefix;

pub const NLA_ALIGNTO: usize = 4;

/// Round `len` up to the 4-byte attribute boundary.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

pub const NLA_HDRLEN: usize = 4;

pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

/// Attribute header: total length, then type.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlAttr {
    /// Length including header.
    pub nla_len: u16,
    pub nla_type: u16,
}

impl NlAttr {
    pub fn new(attr_type: u16, data_len: usize) -> Self {
        Self {
            nla_len: (NLA_HDRLEN + data_len) as u16,
            nla_type: attr_type,
        }
    }

    /// Attribute type without the nested/byte-order flags.
    pub fn kind(&self) -> u16 {
        self.nla_type & NLA_TYPE_MASK
    }

    pub fn as_bytes(&self) -> &[u8] {
        IntoBytes::as_bytes(self)
    }

    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        ref_prefix(data)
    }
}

/// Iterator over the attributes packed in a buffer.
///
/// Stops at the first malformed header rather than erroring; callers treat
/// whatever was decoded up to that point as the message contents.
pub struct AttrIter<'a> {
    data: &'a [u8],
}

impl<'a> AttrIter<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl<'a> Iterator for AttrIter<'a> {
    /// (attribute type, payload)
    type Item = (u16, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let attr = NlAttr::from_bytes(self.data).ok()?;

        let len = attr.nla_len as usize;
        if !(NLA_HDRLEN..=self.data.len()).contains(&len) {
            self.data = &[];
            return None;
        }

        let (whole, rest) = self.data.split_at(len);
        let padding = (nla_align(len) - len).min(rest.len());
        self.data = &rest[padding..];

        Some((attr.kind(), &whole[NLA_HDRLEN..]))
    }
}

/// Typed accessors for attribute payloads.
pub mod get {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use super::*;

    /// Extract a u32 value (native endian).
    pub fn u32_ne(data: &[u8]) -> Result<u32> {
        let bytes: [u8; 4] = data
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| Error::InvalidAttribute("truncated u32 attribute".into()))?;
        Ok(u32::from_ne_bytes(bytes))
    }

    /// Extract a null-terminated string.
    pub fn string(data: &[u8]) -> Result<&str> {
        let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        std::str::from_utf8(&data[..len])
            .map_err(|e| Error::InvalidAttribute(format!("invalid UTF-8: {}", e)))
    }

    /// Extract an IP address of the given family (AF_INET / AF_INET6).
    pub fn ip_addr(data: &[u8], family: u8) -> Result<IpAddr> {
        match i32::from(family) {
            libc::AF_INET => {
                let octets: [u8; 4] = data
                    .get(..4)
                    .and_then(|b| b.try_into().ok())
                    .ok_or_else(|| Error::InvalidAttribute("truncated IPv4 address".into()))?;
                Ok(IpAddr::V4(Ipv4Addr::from(octets)))
            }
            libc::AF_INET6 => {
                let octets: [u8; 16] = data
                    .get(..16)
                    .and_then(|b| b.try_into().ok())
                    .ok_or_else(|| Error::InvalidAttribute("truncated IPv6 address".into()))?;
                Ok(IpAddr::V6(Ipv6Addr::from(octets)))
            }
            other => Err(Error::InvalidAttribute(format!(
                "unsupported address family {}",
                other
            ))),
        }
    }
}
