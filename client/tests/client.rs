//! End-to-end tests against an in-process broadcast server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use blive_client::proto::{BufExt, Header, Operation, Packer, Version};
use blive_client::{
    Builder, Client, Context, DanmuMsg, DanmuServer, Error, Event, Exhaust, RoomResolver, State,
};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Resolver pointing at an in-process server, counting its calls.
#[derive(Debug)]
struct LocalResolver {
    url: String,
    calls: Arc<AtomicUsize>,
}

impl LocalResolver {
    fn new(url: String) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));

        (
            LocalResolver {
                url,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl RoomResolver for LocalResolver {
    async fn resolve(&self, _room_id: u64) -> blive_client::Result<DanmuServer> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        Ok(DanmuServer {
            url: self.url.clone(),
            token: "ticket".into(),
        })
    }
}

/// Resolver whose room never resolves.
#[derive(Debug)]
struct DownResolver {
    calls: Arc<AtomicUsize>,
}

impl RoomResolver for DownResolver {
    async fn resolve(&self, _room_id: u64) -> blive_client::Result<DanmuServer> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        Err(Error::resolve("room service down"))
    }
}

fn test_client(url: String) -> (Client<LocalResolver>, Arc<AtomicUsize>) {
    let (resolver, calls) = LocalResolver::new(url);
    let client = Builder::new(1)
        .resolver(resolver)
        .retries(3)
        .retry_delay(Duration::from_millis(10))
        .heartbeat_interval(Duration::from_millis(50))
        .read_timeout(Duration::from_secs(2))
        .build();

    (client, calls)
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    (listener, url)
}

/// Accept one session and read the auth frame off it.
async fn accept_room(listener: &TcpListener) -> (WebSocketStream<TcpStream>, Value) {
    let (stream, _) = listener.accept().await.unwrap();
    let mut ws = accept_async(stream).await.unwrap();

    let auth = loop {
        match ws.next().await.unwrap().unwrap() {
            Message::Binary(raw) => {
                let mut buf = &raw[..];
                let header = buf.get_header().unwrap();
                assert_eq!(header.operation, Operation::Auth);

                break serde_json::from_slice::<Value>(buf).unwrap();
            }
            _ => continue,
        }
    };

    (ws, auth)
}

fn notify(packer: &Packer, body: &Value) -> Message {
    Message::Binary(packer.pack(body, Operation::Notify).unwrap())
}

fn auth_reply(packer: &Packer, code: i64) -> Message {
    Message::Binary(packer.pack(&json!({ "code": code }), Operation::AuthReply).unwrap())
}

#[tokio::test]
async fn test_receives_and_dispatches() {
    let (listener, url) = bind().await;
    let (client, _) = test_client(url);

    let server = tokio::spawn(async move {
        let packer = Packer::new();
        let (mut ws, auth) = accept_room(&listener).await;

        assert_eq!(auth["roomid"], json!(1));
        assert_eq!(auth["key"], json!("ticket"));
        assert_eq!(auth["type"], json!(2));

        ws.send(auth_reply(&packer, 0)).await.unwrap();
        // one handled kind, one nobody subscribed to
        ws.send(notify(
            &packer,
            &json!({"cmd": "DANMU_MSG", "info": [[], "hi chat", [7, "viewer", 0]]}),
        ))
        .await
        .unwrap();
        ws.send(notify(&packer, &json!({"cmd": "NOTICE_MSG"})))
            .await
            .unwrap();

        // drain heartbeats until the client hangs up
        while ws.next().await.transpose().ok().flatten().is_some() {}
    });

    let (seen_tx, mut seen) = mpsc::unbounded_channel::<Context>();
    client.on(Event::DanmuMsg, move |ctx| {
        let seen = seen_tx.clone();
        async move {
            seen.send(ctx).unwrap();
            Ok(())
        }
    });

    client.start().await.unwrap();

    let ctx = timeout(TIMEOUT, seen.recv()).await.unwrap().unwrap();
    assert_eq!(ctx.cmd(), Some("DANMU_MSG"));
    assert_eq!(ctx.header().operation, Operation::Notify);

    let danmu = DanmuMsg::new(ctx.body());
    assert_eq!(danmu.content(), "hi chat");
    assert_eq!(danmu.sender().name, "viewer");

    client.stop().await;
    client.join().await.unwrap();
    assert_eq!(client.state(), State::Closed);

    timeout(TIMEOUT, server).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_reconnects_after_server_drop() {
    let (listener, url) = bind().await;
    let (client, _) = test_client(url);

    let server = tokio::spawn(async move {
        let packer = Packer::new();

        // first session dies right after the handshake
        let (mut ws, _) = accept_room(&listener).await;
        ws.close(None).await.unwrap();
        drop(ws);

        // second session delivers
        let (mut ws, _) = accept_room(&listener).await;
        ws.send(auth_reply(&packer, 0)).await.unwrap();
        ws.send(notify(&packer, &json!({"cmd": "DANMU_MSG", "info": [[], "back", []]})))
            .await
            .unwrap();

        while ws.next().await.transpose().ok().flatten().is_some() {}
    });

    let (seen_tx, mut seen) = mpsc::unbounded_channel::<Context>();
    client.on(Event::DanmuMsg, move |ctx| {
        let seen = seen_tx.clone();
        async move {
            seen.send(ctx).unwrap();
            Ok(())
        }
    });

    client.start().await.unwrap();

    let ctx = timeout(TIMEOUT, seen.recv()).await.unwrap().unwrap();
    assert_eq!(DanmuMsg::new(ctx.body()).content(), "back");

    client.stop().await;
    timeout(TIMEOUT, server).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_connect_retries_until_exhausted() {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = Builder::new(1)
        .resolver(DownResolver {
            calls: calls.clone(),
        })
        .retries(3)
        .retry_delay(Duration::from_millis(10))
        .build();

    client.start().await.unwrap();

    match timeout(TIMEOUT, client.join()).await.unwrap() {
        Err(Error::ConnectFailed { attempts }) => assert_eq!(attempts, 3),
        other => panic!("expected ConnectFailed, got {other:?}"),
    }

    // one resolve per attempt, the budget and nothing more
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(client.state(), State::Disconnected);
}

#[tokio::test]
async fn test_exhausted_round_can_give_up_quietly() {
    let calls = Arc::new(AtomicUsize::new(0));
    let client = Builder::new(1)
        .resolver(DownResolver {
            calls: calls.clone(),
        })
        .retries(2)
        .retry_delay(Duration::from_millis(10))
        .exhaust(Exhaust::GiveUp)
        .build();

    client.start().await.unwrap();

    timeout(TIMEOUT, client.join()).await.unwrap().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(client.state(), State::Disconnected);
}

#[tokio::test]
async fn test_heartbeat_cadence_and_stop() {
    let (listener, url) = bind().await;
    let (client, _) = test_client(url);

    let (beats_tx, mut beats) = mpsc::unbounded_channel::<Header>();

    let server = tokio::spawn(async move {
        let packer = Packer::new();
        let (mut ws, _) = accept_room(&listener).await;

        ws.send(auth_reply(&packer, 0)).await.unwrap();

        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Binary(raw) = msg {
                let header = (&raw[..]).get_header().unwrap();
                if header.operation == Operation::Heartbeat {
                    beats_tx.send(header).unwrap();
                }
            }
        }
        // the socket closed; no more heartbeats can arrive
    });

    client.start().await.unwrap();

    let first = timeout(TIMEOUT, beats.recv()).await.unwrap().unwrap();
    let second = timeout(TIMEOUT, beats.recv()).await.unwrap().unwrap();

    assert_eq!(first.version, Version::Plain);
    // the sequence counter moves once per outbound frame and never resets
    assert!(second.sequence > first.sequence);

    client.stop().await;

    // once the session is gone the server side runs out and drops the sender
    timeout(TIMEOUT, server).await.unwrap().unwrap();
    while beats.try_recv().is_ok() {}
    assert!(timeout(TIMEOUT, beats.recv()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_stop_is_idempotent_and_start_is_once() {
    let (listener, url) = bind().await;
    let (client, _) = test_client(url);

    let server = tokio::spawn(async move {
        let packer = Packer::new();
        let (mut ws, _) = accept_room(&listener).await;
        ws.send(auth_reply(&packer, 0)).await.unwrap();
        while ws.next().await.transpose().ok().flatten().is_some() {}
    });

    client.start().await.unwrap();
    assert!(matches!(
        client.start().await,
        Err(Error::AlreadyStarted)
    ));

    client.stop().await;
    client.stop().await;
    client.join().await.unwrap();

    timeout(TIMEOUT, server).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_rooms_run_independently() {
    let (listener_a, url_a) = bind().await;
    let (listener_b, url_b) = bind().await;
    let (client_a, _) = test_client(url_a);
    let (client_b, _) = test_client(url_b);

    for (listener, text) in [(listener_a, "room a"), (listener_b, "room b")] {
        tokio::spawn(async move {
            let packer = Packer::new();
            let (mut ws, _) = accept_room(&listener).await;
            ws.send(auth_reply(&packer, 0)).await.unwrap();
            ws.send(notify(&packer, &json!({"cmd": "DANMU_MSG", "info": [[], text, []]})))
                .await
                .unwrap();
            while ws.next().await.transpose().ok().flatten().is_some() {}
        });
    }

    let (tx_a, mut rx_a) = mpsc::unbounded_channel::<String>();
    client_a.on(Event::DanmuMsg, move |ctx| {
        let tx = tx_a.clone();
        async move {
            tx.send(DanmuMsg::new(ctx.body()).content().to_owned()).unwrap();
            Ok(())
        }
    });

    let (tx_b, mut rx_b) = mpsc::unbounded_channel::<String>();
    client_b.on(Event::DanmuMsg, move |ctx| {
        let tx = tx_b.clone();
        async move {
            tx.send(DanmuMsg::new(ctx.body()).content().to_owned()).unwrap();
            Ok(())
        }
    });

    client_a.start().await.unwrap();
    client_b.start().await.unwrap();

    assert_eq!(timeout(TIMEOUT, rx_a.recv()).await.unwrap().unwrap(), "room a");
    assert_eq!(timeout(TIMEOUT, rx_b.recv()).await.unwrap().unwrap(), "room b");

    client_a.stop().await;
    client_b.stop().await;
}
