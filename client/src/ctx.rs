use std::sync::Arc;

use serde_json::Value;

use crate::proto::Header;

/// Per-dispatch view of one decoded notify message.
///
/// Cheap to clone; every handler in a fan-out gets its own copy.
#[derive(Clone, Debug)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    room_id: u64,
    uname: String,
    header: Header,
    body: Value,
}

impl Context {
    pub(crate) fn new<S: Into<String>>(room_id: u64, uname: S, header: Header, body: Value) -> Self {
        Context {
            inner: Arc::new(Inner {
                room_id,
                uname: uname.into(),
                header,
                body,
            }),
        }
    }

    /// Real id of the room this message came from.
    pub fn room_id(&self) -> u64 {
        self.inner.room_id
    }

    /// Streamer name, as resolved at startup.
    pub fn uname(&self) -> &str {
        &self.inner.uname
    }

    pub fn header(&self) -> &Header {
        &self.inner.header
    }

    pub fn body(&self) -> &Value {
        &self.inner.body
    }

    /// Routing key of the message, the `cmd` field.
    pub fn cmd(&self) -> Option<&str> {
        self.inner.body.get("cmd").and_then(Value::as_str)
    }

    /// Walk a dotted path into the body; any missing step yields `None`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        get(&self.inner.body, path)
    }
}

/// Nested lookup over a decoded payload, `"data.fans_medal.medal_name"`
/// style. Numeric steps index into arrays. A missing or mistyped step yields
/// `None`, never a panic.
pub fn get<'a>(v: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(v, |v, step| match step.parse::<usize>() {
        Ok(idx) => v.get(idx),
        Err(_) => v.get(step),
    })
}
