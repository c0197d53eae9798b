use std::sync::atomic::{AtomicU32, Ordering};

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

use crate::{
    error::{Error, Result},
    frame::{Header, Operation, Version},
};

pub trait BufMutExt {
    fn put_header(&mut self, header: Header);
}

impl<T> BufMutExt for T
where
    T: BufMut,
{
    fn put_header(&mut self, h: Header) {
        header(self, h)
    }
}

/// Put a wire header into the buffer.
pub fn header<B: BufMut>(mut buf: B, header: Header) {
    buf.put_u32(header.total_size);
    buf.put_u16(header.header_size);
    buf.put_u16(header.version.into());
    buf.put_u32(header.operation.into());
    buf.put_u32(header.sequence);
}

/// Outbound frame packer, owner of the per-session sequence counter.
///
/// The counter starts at zero and moves forward once per packed frame, for
/// the lifetime of the packer. Sends are expected to come from a single task,
/// the atomic only guards against the occasional stray caller.
#[derive(Debug, Default)]
pub struct Packer {
    sequence: AtomicU32,
}

impl Packer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pack an outbound control message as a plain frame.
    pub fn pack<T: Serialize>(&self, body: &T, operation: Operation) -> Result<Bytes> {
        self.pack_with(body, operation, Version::Plain)
    }

    pub fn pack_with<T: Serialize>(
        &self,
        body: &T,
        operation: Operation,
        version: Version,
    ) -> Result<Bytes> {
        let body = serde_json::to_vec(body).map_err(Error::Encode)?;
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;

        let mut buf = BytesMut::with_capacity(Header::SIZE + body.len());
        buf.put_header(Header::new(body.len(), version, operation, sequence));
        buf.put_slice(&body);

        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::frame::decode::{header as parse_header, unpack};
    use crate::msg;

    #[test]
    fn test_header_round_trip() {
        for (operation, version) in [
            (Operation::Heartbeat, Version::Plain),
            (Operation::Notify, Version::Deflate),
            (Operation::Auth, Version::Plain),
            (Operation::AuthReply, Version::Brotli),
        ] {
            let h = Header::new(11, version, operation, 3);

            let mut buf = Vec::new();
            buf.put_header(h);
            assert_eq!(buf.len(), Header::SIZE);

            assert_eq!(parse_header(buf.as_slice()).unwrap(), h);
        }
    }

    #[test]
    fn test_pack_layout() {
        let packer = Packer::new();
        let b = packer.pack(&msg::heartbeat(), Operation::Heartbeat).unwrap();

        // {} is two bytes of body behind the 16-byte header
        assert_eq!(b.len(), 18);
        assert_eq!(&b[..4], &18u32.to_be_bytes());
        assert_eq!(&b[4..6], &16u16.to_be_bytes());
        assert_eq!(&b[16..], b"{}");
    }

    #[test]
    fn test_pack_unpack_round_trip() {
        let packer = Packer::new();
        let body = json!({"cmd": "DANMU_MSG", "info": [1, "hello"]});

        let b = packer.pack(&body, Operation::Notify).unwrap();
        let packets = unpack(&b).unwrap();

        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].header.operation, Operation::Notify);
        assert_eq!(packets[0].header.version, Version::Plain);
        assert_eq!(packets[0].header.sequence, 1);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&packets[0].body).unwrap(),
            body
        );
    }

    #[test]
    fn test_sequence_moves_once_per_pack() {
        let packer = Packer::new();

        for expected in 1..=3u32 {
            let b = packer.pack(&msg::heartbeat(), Operation::Heartbeat).unwrap();
            let h = parse_header(&b[..]).unwrap();

            assert_eq!(h.sequence, expected);
        }
    }
}
