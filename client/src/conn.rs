use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    error::{Error, Result},
    proto::{heartbeat, unpack, Auth, AuthReply, Operation, Packer, Packet},
    resolver::{DanmuServer, RoomResolver},
    state::State,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Session tuning knobs. The defaults are the protocol's.
#[derive(Clone, Debug)]
pub struct Options {
    /// Connect attempts per (re)connect round.
    pub retries: usize,
    /// Pause between connect attempts.
    pub retry_delay: Duration,
    /// Heartbeat cadence while live.
    pub heartbeat_interval: Duration,
    /// Idle budget on the socket before the session is presumed dead.
    pub read_timeout: Duration,
    /// What to do once a reconnect round runs out of attempts.
    pub exhaust: Exhaust,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            retries: 5,
            retry_delay: Duration::from_secs(1),
            heartbeat_interval: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            exhaust: Exhaust::Surface,
        }
    }
}

/// Behavior once a reconnect round runs out of attempts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Exhaust {
    /// The session task ends with [`Error::ConnectFailed`].
    #[default]
    Surface,
    /// The session task parks in `Disconnected` and ends cleanly.
    GiveUp,
}

/// What ended a live session.
enum Session {
    Stopped,
    Lost,
}

/// Outcome of a connect round.
enum Connected {
    Ws(Box<WsStream>),
    Cancelled,
    Exhausted,
}

/// One logical session to a broadcast room.
///
/// Owns the socket, the heartbeat cadence and the reconnect protocol. All
/// state transitions happen on the session task; observers watch them
/// through the state channel.
pub(crate) struct Connection<R> {
    room_id: u64,
    uid: u64,
    resolver: Arc<R>,
    opts: Options,
    packer: Packer,
    state: watch::Sender<State>,
    cached: Option<DanmuServer>,
}

impl<R: RoomResolver> Connection<R> {
    pub(crate) fn new(
        room_id: u64,
        uid: u64,
        resolver: Arc<R>,
        opts: Options,
        state: watch::Sender<State>,
    ) -> Self {
        Connection {
            room_id,
            uid,
            resolver,
            opts,
            packer: Packer::new(),
            state,
            cached: None,
        }
    }

    /// Drive the session until stopped or the reconnect budget runs dry.
    #[instrument(skip_all, fields(room = self.room_id), err, level = "debug")]
    pub(crate) async fn run(
        mut self,
        packets: mpsc::UnboundedSender<Packet>,
        cancel: CancellationToken,
    ) -> Result<()> {
        let res = self.drive(&packets, &cancel).await;

        if cancel.is_cancelled() {
            self.state.send_replace(State::Closed);
        }

        res
    }

    async fn drive(
        &mut self,
        packets: &mpsc::UnboundedSender<Packet>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        loop {
            let mut ws = match self.connect(cancel).await? {
                Connected::Ws(ws) => ws,
                Connected::Cancelled => return Ok(()),
                Connected::Exhausted => {
                    self.state.send_replace(State::Disconnected);

                    return Ok(());
                }
            };

            match self.session(&mut ws, packets, cancel).await {
                Session::Stopped => {
                    let _ = ws.close().await;

                    return Ok(());
                }
                Session::Lost => {
                    let _ = ws.close().await;
                    self.state.send_replace(State::Reconnecting);
                }
            }
        }
    }

    /// One bounded connect round.
    async fn connect(&mut self, cancel: &CancellationToken) -> Result<Connected> {
        for attempt in 1..=self.opts.retries {
            if cancel.is_cancelled() {
                return Ok(Connected::Cancelled);
            }

            self.state.send_replace(State::Connecting);

            match self.try_connect().await {
                Ok(ws) => {
                    self.state.send_replace(State::Live);

                    return Ok(Connected::Ws(Box::new(ws)));
                }
                Err(err) => {
                    warn!(%err, attempt, "connect attempt failed");

                    // whatever we had cached was no good
                    self.cached = None;
                }
            }

            if attempt < self.opts.retries {
                tokio::select! {
                    _ = cancel.cancelled() => return Ok(Connected::Cancelled),
                    _ = time::sleep(self.opts.retry_delay) => {}
                }
            }
        }

        match self.opts.exhaust {
            Exhaust::Surface => {
                self.state.send_replace(State::Disconnected);

                Err(Error::ConnectFailed {
                    attempts: self.opts.retries,
                })
            }
            Exhaust::GiveUp => Ok(Connected::Exhausted),
        }
    }

    /// One authentication round: resolve (cached), open the socket, present
    /// the ticket.
    async fn try_connect(&mut self) -> Result<WsStream> {
        let server = match self.cached.clone() {
            Some(server) => server,
            None => {
                let server = self.resolver.resolve(self.room_id).await?;
                self.cached = Some(server.clone());
                server
            }
        };

        let (mut ws, _) = connect_async(server.url.as_str()).await?;

        self.state.send_replace(State::Authenticating);

        let auth = Auth::new(self.room_id, server.token, self.uid);
        let frame = self.packer.pack(&auth, Operation::Auth)?;
        ws.send(Message::Binary(frame)).await?;

        Ok(ws)
    }

    /// Live phase: pump the socket and keep the heartbeat cadence until the
    /// peer goes quiet, the transport fails, or we are told to stop.
    async fn session(
        &mut self,
        ws: &mut WsStream,
        packets: &mpsc::UnboundedSender<Packet>,
        cancel: &CancellationToken,
    ) -> Session {
        let mut heartbeat = time::interval(self.opts.heartbeat_interval);
        heartbeat.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        let mut deadline = Instant::now() + self.opts.read_timeout;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Session::Stopped,
                _ = heartbeat.tick() => {
                    if let Err(err) = self.beat(ws).await {
                        warn!(%err, "heartbeat failed");

                        return Session::Lost;
                    }
                }
                _ = time::sleep_until(deadline) => {
                    warn!("read timed out");

                    return Session::Lost;
                }
                msg = ws.next() => {
                    deadline = Instant::now() + self.opts.read_timeout;

                    match msg {
                        Some(Ok(Message::Binary(raw))) => match unpack(&raw) {
                            Ok(pkts) => {
                                for packet in pkts {
                                    if !self.inbound(packet, packets) {
                                        return Session::Lost;
                                    }
                                }
                            }
                            // partners may speak frames we do not know yet
                            Err(err) => debug!(%err, "dropped undecodable frame"),
                        },
                        Some(Ok(Message::Close(frame))) => {
                            info!(?frame, "peer closed the session");

                            return Session::Lost;
                        }
                        Some(Ok(_)) => {} // not a binary frame, not ours
                        Some(Err(err)) => {
                            warn!(%err, "transport error");

                            return Session::Lost;
                        }
                        None => {
                            info!("transport ended");

                            return Session::Lost;
                        }
                    }
                }
            }
        }
    }

    /// Hand one decoded packet downstream. Returns `false` when the packet
    /// means the session cannot go on as authenticated.
    fn inbound(&mut self, packet: Packet, packets: &mpsc::UnboundedSender<Packet>) -> bool {
        match packet.header.operation {
            Operation::AuthReply => match AuthReply::parse(&packet.body) {
                Ok(reply) if reply.is_ok() => info!("authenticated"),
                Ok(reply) => {
                    warn!(code = ?reply.code(), "authentication rejected");

                    // the cached ticket is stale, re-resolve on reconnect
                    self.cached = None;

                    return false;
                }
                Err(err) => debug!(%err, "unreadable auth reply"),
            },
            Operation::HeartbeatReply => trace!("heartbeat acknowledged"),
            _ => {}
        }

        let _ = packets.send(packet);

        true
    }

    /// Send one heartbeat. Only called while live.
    async fn beat(&mut self, ws: &mut WsStream) -> Result<()> {
        let frame = self.packer.pack(&heartbeat(), Operation::Heartbeat)?;
        ws.send(Message::Binary(frame)).await?;

        trace!("heartbeat sent");

        Ok(())
    }
}
