use std::result::Result as StdResult;

use thiserror::Error;

pub type Result<T> = StdResult<T, Error>;

/// Errors triggered while packing or unpacking wire frames.
#[derive(Debug, Error)]
pub enum Error {
    /// buffer too short for a complete header
    #[error("truncated frame, {0} bytes remaining")]
    Incomplete(usize),
    /// a header declared an impossible frame length
    #[error("bad frame length {0}")]
    BadLength(u32),
    /// a header declared a foreign header size
    #[error("bad header size {0}")]
    BadHeaderSize(u16),
    /// compressed payload failed to inflate
    #[error("inflate failed")]
    Inflate,
    /// payload is not valid UTF-8
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
    /// payload is not the expected JSON shape
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// outbound body could not be serialized
    #[error("encode body: {0}")]
    Encode(#[source] serde_json::Error),
}
