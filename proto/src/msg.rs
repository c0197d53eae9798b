use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;

/// Client version string reported during the handshake.
pub const CLIENT_VERSION: &str = "1.4.3";

/// Body of an `Auth` frame, sent right after the transport opens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Auth {
    pub uid: u64,
    pub roomid: u64,
    pub protover: u32,
    pub platform: String,
    #[serde(rename = "type")]
    pub kind: u32,
    pub clientver: String,
    pub key: String,
}

impl Auth {
    /// Build the handshake body for a room.
    ///
    /// `protover` is pinned at 3: this decoder inflates both zlib and brotli
    /// notify payloads.
    pub fn new<S: Into<String>>(roomid: u64, token: S, uid: u64) -> Self {
        Auth {
            uid,
            roomid,
            protover: 3,
            platform: "web".into(),
            kind: 2,
            clientver: CLIENT_VERSION.into(),
            key: token.into(),
        }
    }
}

/// Body of a `Heartbeat` frame, an empty JSON object.
pub fn heartbeat() -> Value {
    json!({})
}

/// Body of an `AuthReply` frame.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct AuthReply {
    pub code: i32,
}

impl AuthReply {
    pub fn parse(body: &str) -> Result<AuthReply> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn code(&self) -> AuthReplyCode {
        self.code.into()
    }

    pub fn is_ok(&self) -> bool {
        self.code() == AuthReplyCode::Ok
    }
}

/// Status of an authentication round-trip.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
pub enum AuthReplyCode {
    Ok = 0,
    TokenError = -101,
    #[num_enum(catch_all)]
    Unknown(i32),
}
