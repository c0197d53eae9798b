//! Read-only accessor views over decoded notify bodies.
//!
//! The upstream payloads are loosely shaped and move without notice; every
//! getter goes through the nested lookup and falls back to a default when a
//! field is absent, so a reshuffled payload degrades instead of breaking.

use serde_json::Value;

use crate::ctx::get;

/// Fan medal worn by a viewer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Medal {
    pub name: String,
    pub level: u64,
}

/// Viewer identity attached to a message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub medal: Medal,
}

/// Gift identity of a SEND_GIFT message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Gift {
    pub id: u64,
    pub name: String,
    pub kind: u64,
}

/// Combo bookkeeping of a SEND_GIFT message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Combo {
    pub batch_id: String,
    pub resources_id: u64,
    pub stay_time: u64,
    pub total_coin: u64,
}

fn str_at(v: &Value, path: &str) -> String {
    get(v, path)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

fn u64_at(v: &Value, path: &str) -> u64 {
    get(v, path).and_then(Value::as_u64).unwrap_or_default()
}

/// View over a DANMU_MSG body, a chat message.
///
/// The interesting parts live in the positional `info` array.
#[derive(Clone, Copy, Debug)]
pub struct DanmuMsg<'a>(&'a Value);

impl<'a> DanmuMsg<'a> {
    pub fn new(body: &'a Value) -> Self {
        DanmuMsg(body)
    }

    pub fn content(&self) -> &str {
        get(self.0, "info.1").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn sender(&self) -> User {
        User {
            id: u64_at(self.0, "info.2.0"),
            name: str_at(self.0, "info.2.1"),
            medal: Medal {
                name: str_at(self.0, "info.3.1"),
                level: u64_at(self.0, "info.3.0"),
            },
        }
    }

    pub fn timestamp(&self) -> u64 {
        u64_at(self.0, "info.9.ts")
    }
}

/// View over an INTERACT_WORD body, a viewer entering the room.
#[derive(Clone, Copy, Debug)]
pub struct InteractWordMsg<'a>(&'a Value);

impl<'a> InteractWordMsg<'a> {
    pub fn new(body: &'a Value) -> Self {
        InteractWordMsg(body)
    }

    pub fn user(&self) -> User {
        User {
            id: u64_at(self.0, "data.uid"),
            name: str_at(self.0, "data.uname"),
            medal: Medal {
                name: str_at(self.0, "data.fans_medal.medal_name"),
                level: u64_at(self.0, "data.fans_medal.medal_level"),
            },
        }
    }

    pub fn timestamp(&self) -> u64 {
        u64_at(self.0, "data.timestamp")
    }
}

/// View over a SEND_GIFT body.
#[derive(Clone, Copy, Debug)]
pub struct SendGiftMsg<'a>(&'a Value);

impl<'a> SendGiftMsg<'a> {
    pub fn new(body: &'a Value) -> Self {
        SendGiftMsg(body)
    }

    pub fn sender(&self) -> User {
        User {
            id: u64_at(self.0, "data.uid"),
            name: str_at(self.0, "data.uname"),
            medal: Medal {
                name: str_at(self.0, "data.medal_info.medal_name"),
                level: u64_at(self.0, "data.medal_info.medal_level"),
            },
        }
    }

    pub fn action(&self) -> &str {
        get(self.0, "data.action").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn gift(&self) -> Gift {
        Gift {
            id: u64_at(self.0, "data.giftId"),
            name: str_at(self.0, "data.giftName"),
            kind: u64_at(self.0, "data.giftType"),
        }
    }

    pub fn combo(&self) -> Combo {
        Combo {
            batch_id: str_at(self.0, "data.batch_combo_id"),
            resources_id: u64_at(self.0, "data.combo_resources_id"),
            stay_time: u64_at(self.0, "data.combo_stay_time"),
            total_coin: u64_at(self.0, "data.combo_total_coin"),
        }
    }
}

/// View over a SUPER_CHAT_MESSAGE body.
#[derive(Clone, Copy, Debug)]
pub struct SuperChatMsg<'a>(&'a Value);

impl<'a> SuperChatMsg<'a> {
    pub fn new(body: &'a Value) -> Self {
        SuperChatMsg(body)
    }

    pub fn content(&self) -> &str {
        get(self.0, "data.message").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn sender(&self) -> User {
        User {
            id: u64_at(self.0, "data.uid"),
            name: str_at(self.0, "data.user_info.uname"),
            medal: Medal {
                name: str_at(self.0, "data.medal_info.medal_name"),
                level: u64_at(self.0, "data.medal_info.medal_level"),
            },
        }
    }

    /// Price in CNY.
    pub fn price(&self) -> u64 {
        u64_at(self.0, "data.price")
    }

    pub fn start_time(&self) -> u64 {
        u64_at(self.0, "data.start_time")
    }

    /// Seconds the message stays pinned.
    pub fn time(&self) -> u64 {
        u64_at(self.0, "data.time")
    }
}

/// View over a HOT_RANK_CHANGED_V2 body.
#[derive(Clone, Copy, Debug)]
pub struct HotRankChangedV2Msg<'a>(&'a Value);

impl<'a> HotRankChangedV2Msg<'a> {
    pub fn new(body: &'a Value) -> Self {
        HotRankChangedV2Msg(body)
    }

    pub fn area_name(&self) -> &str {
        get(self.0, "data.area_name").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn rank_desc(&self) -> &str {
        get(self.0, "data.rank_desc").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn rank(&self) -> u64 {
        u64_at(self.0, "data.rank")
    }

    pub fn trend(&self) -> u64 {
        u64_at(self.0, "data.trend")
    }

    pub fn timestamp(&self) -> u64 {
        u64_at(self.0, "data.timestamp")
    }
}

/// View over a STOP_LIVE_ROOM_LIST body.
#[derive(Clone, Copy, Debug)]
pub struct StopLiveRoomListMsg<'a>(&'a Value);

impl<'a> StopLiveRoomListMsg<'a> {
    pub fn new(body: &'a Value) -> Self {
        StopLiveRoomListMsg(body)
    }

    pub fn room_ids(&self) -> Vec<u64> {
        get(self.0, "data.room_id_list")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_u64).collect())
            .unwrap_or_default()
    }
}
