use crate::frame::{Operation, Version};

/// Wire frame header, 16 bytes, all fields big-endian:
///
/// ```text
/// <TOTAL-SIZE:4 bytes> <HEADER-SIZE:2 bytes> <VERSION:2 bytes>
/// <OPERATION:4 bytes> <SEQUENCE:4 bytes>
/// ```
///
/// `total_size` covers the header itself, so `total_size >= 16` always holds
/// for a well-formed frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub total_size: u32,
    pub header_size: u16,
    pub version: Version,
    pub operation: Operation,
    pub sequence: u32,
}

impl Header {
    pub const SIZE: usize = 16;

    pub fn new(body_len: usize, version: Version, operation: Operation, sequence: u32) -> Self {
        Header {
            total_size: (Self::SIZE + body_len) as u32,
            header_size: Self::SIZE as u16,
            version,
            operation,
            sequence,
        }
    }

    /// Body length declared by this header.
    pub fn body_len(&self) -> usize {
        self.total_size as usize - Self::SIZE
    }
}
