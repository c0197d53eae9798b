use bytes::Buf;

use crate::{
    error::{Error::*, Result},
    frame::{inflate, Header, Operation, Packet, Version},
};

pub trait BufExt {
    fn get_header(&mut self) -> Result<Header>;
}

impl<T> BufExt for T
where
    T: Buf,
{
    fn get_header(&mut self) -> Result<Header> {
        header(self)
    }
}

/// Parse a wire header from the buffer.
pub fn header<B: Buf>(mut buf: B) -> Result<Header> {
    if buf.remaining() < Header::SIZE {
        return Err(Incomplete(buf.remaining()));
    }

    let total_size = buf.get_u32();
    let header_size = buf.get_u16();
    let version = Version::from(buf.get_u16());
    let operation = Operation::from(buf.get_u32());
    let sequence = buf.get_u32();

    if header_size != Header::SIZE as u16 {
        return Err(BadHeaderSize(header_size));
    }
    if (total_size as usize) < Header::SIZE {
        return Err(BadLength(total_size));
    }

    Ok(Header {
        total_size,
        header_size,
        version,
        operation,
        sequence,
    })
}

/// Decode one transport message into its logical frames.
///
/// Frames this client does not understand produce no packets; the caller is
/// expected to log and move on.
pub fn unpack(mut buf: &[u8]) -> Result<Vec<Packet>> {
    let header = buf.get_header()?;

    match header.operation {
        // a heartbeat reply leads with an opaque 4-byte counter, never packed
        Operation::HeartbeatReply => {
            if buf.remaining() < 4 {
                return Err(Incomplete(buf.remaining()));
            }
            buf.advance(4);

            Ok(vec![Packet::new(header, utf8(buf)?)])
        }
        Operation::AuthReply => Ok(vec![Packet::new(header, utf8(buf)?)]),
        Operation::Notify => match header.version {
            Version::Plain => Ok(vec![Packet::new(header, utf8(buf)?)]),
            Version::Deflate => split(&inflate::zlib(buf)?),
            Version::Brotli => split(&inflate::brotli(buf)?),
            _ => Ok(vec![]),
        },
        _ => Ok(vec![]),
    }
}

/// Split an inflated buffer holding one or more packed sub-frames.
///
/// Each sub-frame is a 16-byte header plus body. While more bytes remain than
/// the declared total size, the body ends at the declared boundary; the final
/// sub-frame owns the rest of the buffer. A continuation header reaching past
/// the end of the buffer is a decode error; the loop never spins on bad input.
fn split(mut buf: &[u8]) -> Result<Vec<Packet>> {
    let mut packets = Vec::new();

    loop {
        let header = buf.get_header()?;

        if buf.len() > header.body_len() {
            let (body, rest) = buf.split_at(header.body_len());

            packets.push(Packet::new(header, utf8(body)?));
            buf = rest;
        } else {
            if !packets.is_empty() && buf.len() < header.body_len() {
                return Err(BadLength(header.total_size));
            }

            packets.push(Packet::new(header, utf8(buf)?));

            return Ok(packets);
        }
    }
}

fn utf8(b: &[u8]) -> Result<String> {
    String::from_utf8(b.to_vec()).map_err(Into::into)
}
