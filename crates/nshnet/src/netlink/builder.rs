//! Request construction.

use zerocopy::{Immutable, IntoBytes};

use super::message::{NLMSG_HDRLEN, NlMsgHdr, nlmsg_align};

/// Netlink attribute alignment.
const NLA_ALIGNTO: usize = 4;

/// Size of the attribute header (struct rtattr).
pub const NLA_HDRLEN: usize = 4;

#[inline]
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

/// Builder for one netlink request.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    buf: Vec<u8>,
}

impl MessageBuilder {
    /// Create a new message builder with the given type and flags.
    pub fn new(msg_type: u16, flags: u16) -> Self {
        let header = NlMsgHdr::new(msg_type, flags);
        let mut buf = vec![0u8; NLMSG_HDRLEN];
        buf[..std::mem::size_of::<NlMsgHdr>()].copy_from_slice(header.as_bytes());
        Self { buf }
    }

    /// Append a fixed-size family header such as `ifinfomsg`.
    pub fn append<T: IntoBytes + Immutable>(&mut self, data: &T) {
        self.buf.extend_from_slice(data.as_bytes());
        self.buf.resize(nlmsg_align(self.buf.len()), 0);
    }

    /// Append an attribute with the given type and data.
    pub fn append_attr(&mut self, attr_type: u16, data: &[u8]) {
        let len = (NLA_HDRLEN + data.len()) as u16;
        self.buf.extend_from_slice(&len.to_ne_bytes());
        self.buf.extend_from_slice(&attr_type.to_ne_bytes());
        self.buf.extend_from_slice(data);
        self.buf.resize(nla_align(self.buf.len()), 0);
    }

    /// Append a u32 attribute (native endian).
    pub fn append_attr_u32(&mut self, attr_type: u16, value: u32) {
        self.append_attr(attr_type, &value.to_ne_bytes());
    }

    pub fn set_seq(&mut self, seq: u32) {
        self.buf[8..12].copy_from_slice(&seq.to_ne_bytes());
    }

    pub fn set_pid(&mut self, pid: u32) {
        self.buf[12..16].copy_from_slice(&pid.to_ne_bytes());
    }

    /// Finalize the length field and return the message bytes.
    pub fn finish(mut self) -> Vec<u8> {
        let len = self.buf.len() as u32;
        self.buf[0..4].copy_from_slice(&len.to_ne_bytes());
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::message::NLM_F_REQUEST;

    #[test]
    fn test_simple_message() {
        let msg = MessageBuilder::new(16, NLM_F_REQUEST).finish();
        assert_eq!(msg.len(), NLMSG_HDRLEN);

        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_len as usize, NLMSG_HDRLEN);
        assert_eq!(header.nlmsg_type, 16);
        assert_eq!(header.nlmsg_flags, NLM_F_REQUEST);
    }

    #[test]
    fn test_attribute_is_padded() {
        let mut builder = MessageBuilder::new(28, NLM_F_REQUEST);
        builder.append_attr(2, &[0xaa; 6]);
        builder.append_attr_u32(4, 3);
        let msg = builder.finish();

        // 6-byte MAC pads to 8, then header + u32.
        assert_eq!(msg.len(), NLMSG_HDRLEN + NLA_HDRLEN + 8 + NLA_HDRLEN + 4);
        assert_eq!(&msg[NLMSG_HDRLEN..NLMSG_HDRLEN + 2], &10u16.to_ne_bytes());
    }

    #[test]
    fn test_seq_and_pid() {
        let mut builder = MessageBuilder::new(18, NLM_F_REQUEST);
        builder.set_seq(42);
        builder.set_pid(1000);
        let msg = builder.finish();
        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_seq, 42);
        assert_eq!(header.nlmsg_pid, 1000);
    }
}
