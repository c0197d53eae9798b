use num_enum::{FromPrimitive, IntoPrimitive};

/// Operation code of a wire frame.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
pub enum Operation {
    /// Sent by the client on a fixed cadence while the session is live.
    Heartbeat = 2,
    /// Reply to a HEARTBEAT frame, carrying the room popularity counter.
    HeartbeatReply = 3,
    /// Sent by the server to push application event payloads.
    Notify = 5,
    /// Sent by the client right after the transport opens.
    Auth = 7,
    /// Reply to an AUTH frame, closing the handshake.
    AuthReply = 8,
    #[num_enum(catch_all)]
    Unknown(u32),
}

/// Body encoding of a wire frame.
#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
pub enum Version {
    /// UTF-8 JSON, uncompressed.
    Plain = 0,
    /// Marker used on heartbeat replies.
    Heartbeat = 1,
    /// zlib-compressed payload, may hold several packed frames.
    Deflate = 2,
    /// brotli-compressed payload, may hold several packed frames.
    Brotli = 3,
    #[num_enum(catch_all)]
    Unknown(u16),
}
