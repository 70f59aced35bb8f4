//! Request assembly: one netlink header followed by a family header and
//! attributes, each padded to the 4-byte boundary.

use zerocopy::{Immutable, IntoBytes};

use super::attr::{NLA_F_NESTED, NlAttr};
use super::message::{NLMSG_HDRLEN, NlMsgHdr, nlmsg_align};

// Byte offsets of the nlmsghdr fields patched after construction.
const LEN_AT: usize = 0;
const TYPE_AT: usize = 4;
const SEQ_AT: usize = 8;
const PID_AT: usize = 12;

/// Marks an open nested attribute; hand it back to [`MessageBuilder::nest_end`].
#[derive(Debug, Clone, Copy)]
pub struct NestToken {
    start: usize,
}

/// Growable buffer holding a single request.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    buf: Vec<u8>,
}

impl MessageBuilder {
    pub fn new(msg_type: u16, flags: u16) -> Self {
        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(NlMsgHdr::new(msg_type, flags).as_bytes());
        buf.resize(NLMSG_HDRLEN, 0);
        Self { buf }
    }

    pub fn msg_type(&self) -> u16 {
        u16::from_ne_bytes([self.buf[TYPE_AT], self.buf[TYPE_AT + 1]])
    }

    /// Zero-fill up to the next 4-byte boundary. Netlink and attribute
    /// alignment are the same.
    fn pad(&mut self) {
        self.buf.resize(nlmsg_align(self.buf.len()), 0);
    }

    fn put_u32_at(&mut self, at: usize, value: u32) {
        self.buf[at..at + 4].copy_from_slice(&value.to_ne_bytes());
    }

    pub fn append_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
        self.pad();
    }

    /// Append a fixed family header such as `IfInfoMsg` or `RtMsg`.
    pub fn append<T: IntoBytes + Immutable>(&mut self, data: &T) {
        self.append_bytes(data.as_bytes());
    }

    pub fn append_attr(&mut self, attr_type: u16, data: &[u8]) {
        self.buf
            .extend_from_slice(NlAttr::new(attr_type, data.len()).as_bytes());
        self.append_bytes(data);
    }

    pub fn append_attr_u32(&mut self, attr_type: u16, value: u32) {
        self.append_attr(attr_type, &value.to_ne_bytes());
    }

    /// String attributes carry their NUL terminator.
    pub fn append_attr_str(&mut self, attr_type: u16, value: &str) {
        let mut data = Vec::with_capacity(value.len() + 1);
        data.extend_from_slice(value.as_bytes());
        data.push(0);
        self.append_attr(attr_type, &data);
    }

    /// Open a nested attribute. Its length is filled in by `nest_end`.
    pub fn nest_start(&mut self, attr_type: u16) -> NestToken {
        let start = self.buf.len();
        self.buf
            .extend_from_slice(NlAttr::new(attr_type | NLA_F_NESTED, 0).as_bytes());
        NestToken { start }
    }

    pub fn nest_end(&mut self, token: NestToken) {
        let len = (self.buf.len() - token.start) as u16;
        self.buf[token.start..token.start + 2].copy_from_slice(&len.to_ne_bytes());
        self.pad();
    }

    pub fn set_seq(&mut self, seq: u32) {
        self.put_u32_at(SEQ_AT, seq);
    }

    pub fn set_pid(&mut self, pid: u32) {
        self.put_u32_at(PID_AT, pid);
    }

    /// Stamp the total length and hand out the wire bytes.
    pub fn finish(mut self) -> Vec<u8> {
        let len = self.buf.len() as u32;
        self.put_u32_at(LEN_AT, len);
        self.buf
    }
}
