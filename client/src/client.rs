use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::{
    conn::{Connection, Exhaust, Options},
    ctx::Context,
    dispatch::{Dispatcher, ErrorHandlers},
    error::{Error, Result},
    proto::{Operation, Packet},
    resolver::{HttpResolver, RoomInfo, RoomResolver},
    state::State,
};

/// Subscriber for one broadcast room.
///
/// Wires the session's decoded frame stream into the dispatcher and exposes
/// registration plus lifecycle to the caller. Independent clients, one per
/// room, run side by side without sharing anything but an optional
/// error-handler table.
pub struct Client<R = HttpResolver> {
    room_id: u64,
    uid: u64,
    opts: Options,
    resolver: Arc<R>,
    dispatcher: Arc<Dispatcher>,
    state: watch::Receiver<State>,
    state_tx: Mutex<Option<watch::Sender<State>>>,
    session: Mutex<Option<JoinHandle<Result<()>>>>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl Client<HttpResolver> {
    /// A client for `room_id` with protocol-default options.
    pub fn new(room_id: u64) -> Self {
        Self::builder(room_id).build()
    }

    pub fn builder(room_id: u64) -> Builder<HttpResolver> {
        Builder::new(room_id)
    }
}

impl<R: RoomResolver> Client<R> {
    /// Register a handler for one event key.
    ///
    /// Keys are the protocol `cmd` strings; [`Event`](crate::Event) renders
    /// to them, and raw strings work for kinds the enum does not list.
    pub fn on<K, F, Fut>(&self, event: K, handler: F) -> &Self
    where
        K: ToString,
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.dispatcher.register(event.to_string(), handler);
        self
    }

    /// Register one handler for several event keys at once.
    pub fn on_many<K, F, Fut>(&self, events: impl IntoIterator<Item = K>, handler: F) -> &Self
    where
        K: ToString,
        F: Fn(Context) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        for event in events {
            self.dispatcher.register(event.to_string(), handler.clone());
        }
        self
    }

    /// Register an instance-scoped error handler for handler failures of
    /// type `E`.
    pub fn catch<E, F>(&self, handler: F) -> &Self
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
        F: Fn(&E, &Context) + Send + Sync + 'static,
    {
        self.dispatcher.catch(handler);
        self
    }

    /// Current lifecycle state of the session.
    pub fn state(&self) -> State {
        *self.state.borrow()
    }

    /// Resolve the room and spawn the session plus the dispatch pump.
    pub async fn start(&self) -> Result<()> {
        let state_tx = self
            .state_tx
            .lock()
            .unwrap()
            .take()
            .ok_or(Error::AlreadyStarted)?;

        let info = match self.resolver.room_info(self.room_id).await {
            Ok(info) => info,
            Err(err) => {
                // hand the channel back so a later start can retry
                *self.state_tx.lock().unwrap() = Some(state_tx);

                return Err(err);
            }
        };

        info!(room = info.room_id, uname = %info.uname, "starting");

        let (packets_tx, packets_rx) = mpsc::unbounded_channel();

        let conn = Connection::new(
            info.room_id,
            self.uid,
            self.resolver.clone(),
            self.opts.clone(),
            state_tx,
        );
        let session = tokio::spawn(conn.run(packets_tx, self.cancel.clone()));
        *self.session.lock().unwrap() = Some(session);

        tokio::spawn(pump(
            packets_rx,
            self.dispatcher.clone(),
            self.tracker.clone(),
            info,
        ));

        Ok(())
    }

    /// Scoped, idempotent shutdown: end the session, let in-flight dispatch
    /// cycles run to completion, start no new ones.
    pub async fn stop(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Wait for the session task to end and surface its terminal result.
    pub async fn join(&self) -> Result<()> {
        let session = self.session.lock().unwrap().take();

        match session {
            Some(session) => session.await.map_err(|_| Error::Closed)?,
            None => Ok(()),
        }
    }

    /// Start and stay subscribed until the session ends.
    pub async fn run(&self) -> Result<()> {
        self.start().await?;
        self.join().await
    }
}

/// Feed decoded notify packets into dispatch cycles.
///
/// Every cycle runs as its own tracked task, so one slow handler never
/// stalls frame reception or the heartbeat.
async fn pump(
    mut packets: mpsc::UnboundedReceiver<Packet>,
    dispatcher: Arc<Dispatcher>,
    tracker: TaskTracker,
    room: RoomInfo,
) {
    while let Some(packet) = packets.recv().await {
        if packet.header.operation != Operation::Notify {
            continue;
        }

        let body: Value = match serde_json::from_str(&packet.body) {
            Ok(body) => body,
            Err(err) => {
                debug!(%err, "dropped non-JSON notify");
                continue;
            }
        };

        let ctx = Context::new(room.room_id, room.uname.as_str(), packet.header, body);

        if ctx.cmd().is_none() {
            debug!("dropped notify without a cmd");
            continue;
        }

        if tracker.is_closed() {
            break;
        }

        let dispatcher = dispatcher.clone();
        tracker.spawn(async move {
            for err in dispatcher.dispatch(ctx).await {
                warn!(%err, "unhandled handler failure");
            }
        });
    }
}

/// Configuration for a [`Client`].
#[derive(Debug)]
pub struct Builder<R = HttpResolver> {
    room_id: u64,
    uid: u64,
    opts: Options,
    resolver: R,
    shared_errors: Option<Arc<ErrorHandlers>>,
}

impl Builder<HttpResolver> {
    pub fn new(room_id: u64) -> Self {
        Builder {
            room_id,
            uid: 0,
            opts: Options::default(),
            resolver: HttpResolver::new(),
            shared_errors: None,
        }
    }
}

impl<R: RoomResolver> Builder<R> {
    /// Authenticate as this uid instead of a guest.
    pub fn uid(mut self, uid: u64) -> Self {
        self.uid = uid;
        self
    }

    /// Swap in another room resolver.
    pub fn resolver<T: RoomResolver>(self, resolver: T) -> Builder<T> {
        Builder {
            room_id: self.room_id,
            uid: self.uid,
            opts: self.opts,
            resolver,
            shared_errors: self.shared_errors,
        }
    }

    /// Connect attempts per reconnect round.
    pub fn retries(mut self, retries: usize) -> Self {
        self.opts.retries = retries;
        self
    }

    /// Pause between connect attempts.
    pub fn retry_delay(mut self, delay: std::time::Duration) -> Self {
        self.opts.retry_delay = delay;
        self
    }

    /// Heartbeat cadence while live.
    pub fn heartbeat_interval(mut self, interval: std::time::Duration) -> Self {
        self.opts.heartbeat_interval = interval;
        self
    }

    /// Idle budget on the socket before the session is presumed dead.
    pub fn read_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.opts.read_timeout = timeout;
        self
    }

    /// What to do once a reconnect round runs out of attempts.
    pub fn exhaust(mut self, exhaust: Exhaust) -> Self {
        self.opts.exhaust = exhaust;
        self
    }

    /// Share an error-handler table with other clients.
    pub fn error_handlers(mut self, shared: Arc<ErrorHandlers>) -> Self {
        self.shared_errors = Some(shared);
        self
    }

    pub fn build(self) -> Client<R> {
        let (state_tx, state_rx) = watch::channel(State::Disconnected);
        let shared = self.shared_errors.unwrap_or_default();

        Client {
            room_id: self.room_id,
            uid: self.uid,
            opts: self.opts,
            resolver: Arc::new(self.resolver),
            dispatcher: Arc::new(Dispatcher::new(shared)),
            state: state_rx,
            state_tx: Mutex::new(Some(state_tx)),
            session: Mutex::new(None),
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }
}
