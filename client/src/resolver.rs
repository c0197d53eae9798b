use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

const API_BASE: &str = "https://api.live.bilibili.com";

/// Connect target for a room: a wss endpoint and its ticket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DanmuServer {
    pub url: String,
    pub token: String,
}

/// Basic facts about a room: the real id behind a short id, streamer name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: u64,
    pub uname: String,
}

/// Resolves a public room id to a broadcast endpoint and auth token.
///
/// Any failure is treated by the session as a connect-phase transport error
/// and retried within the reconnect budget.
pub trait RoomResolver: Send + Sync + 'static {
    fn resolve(&self, room_id: u64) -> impl Future<Output = Result<DanmuServer>> + Send;

    /// Resolve a possibly-short room id to the real one. The default keeps
    /// the id as given, which is fine for resolvers that only ever see real
    /// ids.
    fn room_info(&self, room_id: u64) -> impl Future<Output = Result<RoomInfo>> + Send {
        async move {
            Ok(RoomInfo {
                room_id,
                uname: String::new(),
            })
        }
    }
}

/// Resolver backed by the public live API.
#[derive(Clone, Debug, Default)]
pub struct HttpResolver {
    http: reqwest::Client,
}

/// Envelope every live-API response comes wrapped in.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct Api<T> {
    code: i64,
    #[serde(default)]
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct DanmuConf {
    host_server_list: Vec<DanmuHost>,
    token: String,
}

#[derive(Debug, Deserialize)]
struct DanmuHost {
    host: String,
    wss_port: u16,
}

#[derive(Debug, Deserialize)]
struct InfoByRoom {
    room_info: RoomInfoData,
    anchor_info: AnchorInfo,
}

#[derive(Debug, Deserialize)]
struct RoomInfoData {
    room_id: u64,
}

#[derive(Debug, Deserialize)]
struct AnchorInfo {
    base_info: BaseInfo,
}

#[derive(Debug, Deserialize)]
struct BaseInfo {
    uname: String,
}

impl HttpResolver {
    pub fn new() -> Self {
        Self::default()
    }

    async fn call<T: DeserializeOwned>(&self, path: &str, room_id: u64) -> Result<T> {
        let resp: Api<T> = self
            .http
            .get(format!("{API_BASE}{path}"))
            .query(&[("room_id", room_id)])
            .send()
            .await
            .map_err(Error::resolve)?
            .json()
            .await
            .map_err(Error::resolve)?;

        debug!(path, room_id, code = resp.code, "live api called");

        match resp {
            Api { code: 0, data: Some(data) } => Ok(data),
            Api { code, .. } => Err(Error::Resolve(format!("live api {path} failed, code {code}"))),
        }
    }
}

impl RoomResolver for HttpResolver {
    async fn resolve(&self, room_id: u64) -> Result<DanmuServer> {
        let conf: DanmuConf = self.call("/room/v1/Danmu/getConf", room_id).await?;

        let host = conf
            .host_server_list
            .first()
            .ok_or_else(|| Error::Resolve("no danmu host available".into()))?;

        Ok(DanmuServer {
            url: format!("wss://{}:{}/sub", host.host, host.wss_port),
            token: conf.token,
        })
    }

    async fn room_info(&self, room_id: u64) -> Result<RoomInfo> {
        let info: InfoByRoom = self
            .call("/xlive/web-room/v1/index/getInfoByRoom", room_id)
            .await?;

        Ok(RoomInfo {
            room_id: info.room_info.room_id,
            uname: info.anchor_info.base_info.uname,
        })
    }
}
