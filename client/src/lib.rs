pub use blive_proto as proto;

mod client;
mod conn;
mod ctx;
mod dispatch;
mod error;
mod event;
mod resolver;
mod state;
mod views;

pub use self::client::{Builder, Client};
pub use self::conn::{Exhaust, Options};
pub use self::ctx::Context;
pub use self::dispatch::{Dispatcher, ErrorHandlers};
pub use self::error::{Error, Result};
pub use self::event::Event;
pub use self::resolver::{DanmuServer, HttpResolver, RoomInfo, RoomResolver};
pub use self::state::State;
pub use self::views::{
    Combo, DanmuMsg, Gift, HotRankChangedV2Msg, InteractWordMsg, Medal, SendGiftMsg,
    StopLiveRoomListMsg, SuperChatMsg, User,
};
