mod error;
mod frame;
mod msg;

pub use self::error::{Error, Result};
pub use self::frame::{unpack, BufExt, BufMutExt, Header, Operation, Packer, Packet, Version};
pub use self::msg::{heartbeat, Auth, AuthReply, AuthReplyCode, CLIENT_VERSION};
