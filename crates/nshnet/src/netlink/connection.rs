//! Request/response handling over a routing socket.

use tracing::trace;

use super::builder::MessageBuilder;
use super::error::{Error, Result};
use super::message::{
    MessageIter, NLM_F_ACK, NLM_F_CREATE, NLM_F_DUMP, NLM_F_EXCL, NLM_F_REPLACE, NLM_F_REQUEST,
    NlMsgError,
};
use super::messages::FromNetlink;
use super::socket::NetlinkSocket;

/// Routing netlink connection.
pub struct Connection {
    socket: NetlinkSocket,
}

impl Connection {
    pub fn new() -> Result<Self> {
        Ok(Self {
            socket: NetlinkSocket::new()?,
        })
    }

    fn stamp(&self, builder: &mut MessageBuilder) -> u32 {
        let seq = self.socket.next_seq();
        builder.set_seq(seq);
        builder.set_pid(self.socket.pid());
        seq
    }

    /// Send a request that expects an ACK only.
    pub async fn request_ack(&self, mut builder: MessageBuilder) -> Result<()> {
        let seq = self.stamp(&mut builder);
        self.socket.send(&builder.finish()).await?;

        loop {
            let data = self.socket.recv_msg().await?;
            for result in MessageIter::new(&data) {
                let (header, payload) = result?;
                if header.nlmsg_seq != seq {
                    continue;
                }
                if header.is_error() {
                    let err = NlMsgError::from_bytes(payload)?;
                    if !err.is_ack() {
                        return Err(Error::from_errno(err.error));
                    }
                    return Ok(());
                }
            }
        }
    }

    /// Send a dump request and collect the payload of every reply.
    pub async fn dump(&self, mut builder: MessageBuilder) -> Result<Vec<Vec<u8>>> {
        let seq = self.stamp(&mut builder);
        self.socket.send(&builder.finish()).await?;

        let mut payloads = Vec::new();
        loop {
            let data = self.socket.recv_msg().await?;
            for result in MessageIter::new(&data) {
                let (header, payload) = result?;
                if header.nlmsg_seq != seq {
                    continue;
                }
                if header.is_error() {
                    let err = NlMsgError::from_bytes(payload)?;
                    if !err.is_ack() {
                        return Err(Error::from_errno(err.error));
                    }
                }
                if header.is_done() {
                    trace!(seq, count = payloads.len(), "dump complete");
                    return Ok(payloads);
                }
                payloads.push(payload.to_vec());
            }
        }
    }

    /// Dump and parse into typed messages, skipping unparseable replies.
    pub async fn dump_typed<T: FromNetlink>(&self, builder: MessageBuilder) -> Result<Vec<T>> {
        let payloads = self.dump(builder).await?;
        Ok(payloads
            .iter()
            .filter_map(|p| T::from_bytes(p).ok())
            .collect())
    }
}

/// Build a dump request.
pub fn dump_request(msg_type: u16) -> MessageBuilder {
    MessageBuilder::new(msg_type, NLM_F_REQUEST | NLM_F_DUMP)
}

/// Build a request expecting an ACK.
pub fn ack_request(msg_type: u16) -> MessageBuilder {
    MessageBuilder::new(msg_type, NLM_F_REQUEST | NLM_F_ACK)
}

/// Build a create request that fails if the object exists.
pub fn create_request(msg_type: u16) -> MessageBuilder {
    MessageBuilder::new(msg_type, NLM_F_REQUEST | NLM_F_ACK | NLM_F_CREATE | NLM_F_EXCL)
}

/// Build a create-or-replace request.
pub fn replace_request(msg_type: u16) -> MessageBuilder {
    MessageBuilder::new(
        msg_type,
        NLM_F_REQUEST | NLM_F_ACK | NLM_F_CREATE | NLM_F_REPLACE,
    )
}
