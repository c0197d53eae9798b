use parse_display::{Display, FromStr};

/// Application event keys carried in the `cmd` field of a notify payload.
///
/// The enum covers the kinds this crate ships typed views or well-known
/// semantics for; registration also accepts any raw `cmd` string, so an
/// unlisted kind can still be subscribed to.
#[derive(Clone, Copy, Debug, Display, FromStr, PartialEq, Eq, Hash)]
#[display(style = "SNAKE_CASE")]
pub enum Event {
    /// the streamer is wrapping up
    Preparing,
    RoomChange,
    RoomRank,
    /// a chat (danmaku) message
    DanmuMsg,
    /// somebody sent a gift
    SendGift,
    WelcomeGuard,
    EntryEffect,
    Welcome,
    /// a viewer entered the room
    InteractWord,
    /// a viewer followed the room
    Attention,
    Share,
    SpecialAttention,
    /// follower count moved
    RoomRealTimeMessageUpdate,
    SuperChatMessage,
    SuperChatMessageJpn,
    SuperChatMessageDelete,
    RoomBlockMsg,
    /// a viewer bought a guard tier
    GuardBuy,
    FirstGuard,
    NewGuardCount,
    UserToastMsg,
    HotRankChanged,
    HotRankSettlement,
    HotRank,
    OnlineRankV2,
    OnlineRankTop3,
    OnlineRankCount,
    NoticeMsg,
    ComboSend,
    SpecialGift,
    AnchorLotCheckstatus,
    AnchorLotStart,
    AnchorLotEnd,
    AnchorLotAward,
    VoiceJoinRoomCountInfo,
    VoiceJoinList,
    VoiceJoinStatus,
    Warning,
    CutOff,
    #[display("room_admin_entrance")]
    RoomAdminEntrance,
    RoomAdmins,
    MedalUpgrade,
    StopLiveRoomList,
    WidgetBanner,
    PkBattleProcessNew,
    PkBattleProcess,
    CommonNoticeDanmaku,
    HotRankChangedV2,
    PkBattleSettle,
    PkBattlePreNew,
}
