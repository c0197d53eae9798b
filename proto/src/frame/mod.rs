mod decode;
mod encode;
mod header;
mod inflate;
mod ty;

pub use self::decode::{unpack, BufExt};
pub use self::encode::{BufMutExt, Packer};
pub use self::header::Header;
pub use self::ty::{Operation, Version};

/// One decoded logical frame and its UTF-8 payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    pub header: Header,
    pub body: String,
}

impl Packet {
    pub fn new(header: Header, body: String) -> Self {
        Packet { header, body }
    }
}
