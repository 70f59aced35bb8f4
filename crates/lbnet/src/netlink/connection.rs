//! Request/response handling over a blocking rtnetlink socket.

use std::path::Path;

use super::builder::MessageBuilder;
use super::error::{Error, Result};
use super::message::{
    MessageIter, NLM_F_ACK, NLM_F_CREATE, NLM_F_DUMP, NLM_F_EXCL, NLM_F_REQUEST, NLMSG_HDRLEN,
    NlMsgError,
};
use super::messages::FromNetlink;
use super::socket::NetlinkSocket;

/// Directory where `ip netns add` bind-mounts named namespaces.
const NETNS_RUN_DIR: &str = "/var/run/netns";

/// rtnetlink connection.
///
/// Every call is a blocking round trip; the connection keeps no state
/// besides the socket and its sequence counter.
pub struct Connection {
    socket: NetlinkSocket,
}

impl Connection {
    /// Open a connection in the current network namespace.
    pub fn new() -> Result<Self> {
        Ok(Self {
            socket: NetlinkSocket::new()?,
        })
    }

    /// Open a connection in the namespace at `ns_path`.
    pub fn new_in_namespace_path<P: AsRef<Path>>(ns_path: P) -> Result<Self> {
        Ok(Self {
            socket: NetlinkSocket::new_in_namespace_path(ns_path)?,
        })
    }

    /// Open a connection in a namespace created with `ip netns add <name>`.
    pub fn for_namespace(name: &str) -> Result<Self> {
        Self::new_in_namespace_path(Path::new(NETNS_RUN_DIR).join(name))
    }

    pub fn socket(&self) -> &NetlinkSocket {
        &self.socket
    }

    /// Send a request that expects an ACK only (no data response).
    pub fn request_ack(&self, mut builder: MessageBuilder) -> Result<()> {
        let seq = self.socket.next_seq();
        builder.set_seq(seq);
        builder.set_pid(self.socket.pid());
        self.socket.send(&builder.finish())?;

        loop {
            let data = self.socket.recv_msg()?;
            for result in MessageIter::new(&data) {
                let (header, payload, _) = result?;
                if header.nlmsg_seq != seq || !header.is_error() {
                    continue;
                }

                let err = NlMsgError::from_bytes(payload)?;
                if !err.is_ack() {
                    return Err(Error::from_errno(err.error));
                }
                return Ok(());
            }
        }
    }

    /// Send a dump request and collect every response message (header
    /// included) until `NLMSG_DONE`.
    pub fn dump(&self, mut builder: MessageBuilder) -> Result<Vec<Vec<u8>>> {
        let seq = self.socket.next_seq();
        builder.set_seq(seq);
        builder.set_pid(self.socket.pid());
        self.socket.send(&builder.finish())?;

        let mut responses = Vec::new();
        loop {
            let data = self.socket.recv_msg()?;

            for result in MessageIter::new(&data) {
                let (header, payload, whole) = result?;
                if header.nlmsg_seq != seq {
                    continue;
                }

                if header.is_done() {
                    return Ok(responses);
                }

                if header.is_error() {
                    let err = NlMsgError::from_bytes(payload)?;
                    if !err.is_ack() {
                        return Err(Error::from_errno(err.error));
                    }
                    continue;
                }

                responses.push(whole.to_vec());
            }
        }
    }

    /// Dump `msg_type` and decode every response as `T`.
    ///
    /// Messages that fail to decode are skipped with a debug log rather
    /// than failing the whole dump.
    pub fn dump_typed<T: FromNetlink>(&self, msg_type: u16) -> Result<Vec<T>> {
        let mut builder = dump_request(msg_type);
        let mut header = Vec::new();
        T::write_dump_header(&mut header);
        builder.append_bytes(&header);

        let responses = self.dump(builder)?;
        let mut parsed = Vec::with_capacity(responses.len());
        for response in responses {
            match T::from_bytes(&response[NLMSG_HDRLEN..]) {
                Ok(msg) => parsed.push(msg),
                Err(e) => tracing::debug!(msg_type, error = %e, "skipping undecodable message"),
            }
        }
        Ok(parsed)
    }
}

/// Helper to build a dump request.
pub fn dump_request(msg_type: u16) -> MessageBuilder {
    MessageBuilder::new(msg_type, NLM_F_REQUEST | NLM_F_DUMP)
}

/// Helper to build a request expecting ACK.
pub fn ack_request(msg_type: u16) -> MessageBuilder {
    MessageBuilder::new(msg_type, NLM_F_REQUEST | NLM_F_ACK)
}

/// Helper to build an exclusive create request: the kernel answers
/// `EEXIST` instead of touching an existing object.
pub fn create_request(msg_type: u16) -> MessageBuilder {
    MessageBuilder::new(
        msg_type,
        NLM_F_REQUEST | NLM_F_ACK | NLM_F_CREATE | NLM_F_EXCL,
    )
}
