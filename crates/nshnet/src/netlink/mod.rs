//! Async rtnetlink backend.
//!
//! A small routing-socket client: request framing, ACK and dump handling,
//! and typed parsing of the address and neighbor replies the backend
//! reads back.

mod builder;
mod connection;
mod error;
mod message;
pub mod messages;
mod socket;
mod stack;
pub mod types;

pub use builder::MessageBuilder;
pub use connection::Connection;
pub use error::{Error, Result};
pub use message::{MessageIter, NLMSG_HDRLEN, NlMsgHdr, NlMsgType};
pub use socket::NetlinkSocket;
pub use stack::NetlinkStack;
