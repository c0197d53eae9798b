pub use blive_proto as proto;

pub use blive_client::{
    Builder, Client, Combo, Context, DanmuMsg, DanmuServer, Dispatcher, Error, ErrorHandlers,
    Event, Exhaust, Gift, HotRankChangedV2Msg, HttpResolver, InteractWordMsg, Medal, Options,
    Result, RoomInfo, RoomResolver, SendGiftMsg, State, StopLiveRoomListMsg, SuperChatMsg, User,
};
