//! End-to-end handshake tests against an in-process backend.

#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use prost::Message as _;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use wnt_gateway::config::SessionConfig;
use wnt_gateway::domain::SessionState;
use wnt_gateway::proto::wnt::{self, MessageCollection, RtSituationMetadata};
use wnt_gateway::service::{SessionResult, drive_session, run_session};

const SESSION_ID: &str = "session-1234";

/// Accepts one WebSocket client, answers its first text message with
/// `reply`, pushes `frames`, then holds the connection until the client
/// leaves. Returns the first message received.
async fn backend(
    listener: TcpListener,
    reply: Value,
    frames: Vec<Vec<u8>>,
) -> JoinHandle<Option<Value>> {
    serve(listener, reply, frames, false)
}

/// Like [`backend`], but closes the connection itself right after
/// replying.
async fn closing_backend(listener: TcpListener, reply: Value) -> JoinHandle<Option<Value>> {
    serve(listener, reply, Vec::new(), true)
}

fn serve(
    listener: TcpListener,
    reply: Value,
    frames: Vec<Vec<u8>>,
    close_after_reply: bool,
) -> JoinHandle<Option<Value>> {
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.ok()?;
        let ws = accept_async(stream).await.ok()?;
        let (mut tx, mut rx) = ws.split();

        let request = loop {
            match rx.next().await? {
                Ok(Message::Text(text)) => {
                    break serde_json::from_str::<Value>(text.as_str()).ok()?;
                }
                Ok(_) => continue,
                Err(_) => return None,
            }
        };

        tx.send(Message::text(reply.to_string())).await.ok()?;
        for frame in frames {
            tx.send(Message::binary(frame)).await.ok()?;
        }
        if close_after_reply {
            tx.send(Message::Close(None)).await.ok()?;
        }

        while let Some(Ok(msg)) = rx.next().await {
            if msg.is_close() {
                break;
            }
        }
        Some(request)
    })
}

async fn listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn config(auth_port: u16, rts_port: u16, timeout: Duration) -> SessionConfig {
    let mut config = SessionConfig::from_lookup(|key| match key {
        "WNT_HOSTNAME" => Some("127.0.0.1".to_string()),
        "WNT_USERNAME" => Some("operator".to_string()),
        "WNT_PASSWORD" => Some("secret".to_string()),
        "WNT_USE_TLS" => Some("false".to_string()),
        _ => None,
    })
    .expect("config");
    config.auth_port = auth_port;
    config.realtime_situation_port = rts_port;
    config.session_timeout = timeout;
    config
}

fn startup_frames(nodes: u32) -> Vec<Vec<u8>> {
    let mut frames = vec![
        wnt::Message {
            rtsituation_metadata: Some(RtSituationMetadata {
                node_count: Some(nodes),
            }),
            ..wnt::Message::default()
        }
        .encode_to_vec(),
    ];
    for address in 1..=nodes {
        frames.push(
            wnt::Message {
                source_address: Some(address),
                network_id: Some(77),
                ..wnt::Message::default()
            }
            .encode_to_vec(),
        );
    }
    frames.push(
        MessageCollection {
            message_collection: vec![wnt::Message {
                source_address: Some(1),
                network_id: Some(77),
                travel_time_ms: Some(120),
                ..wnt::Message::default()
            }],
        }
        .encode_to_vec(),
    );
    frames
}

#[tokio::test]
async fn full_handshake_reaches_wait_forever() {
    let (auth_listener, auth_port) = listener().await;
    let (rts_listener, rts_port) = listener().await;

    let auth = backend(
        auth_listener,
        json!({ "type": 1, "result": 1, "data": { "session_id": SESSION_ID } }),
        Vec::new(),
    )
    .await;
    let rts = backend(
        rts_listener,
        json!({ "type": 2, "result": 1 }),
        startup_frames(3),
    )
    .await;

    let outcome = drive_session(&config(auth_port, rts_port, Duration::from_secs(2)))
        .await
        .expect("session should run");

    assert!(outcome.timed_out);
    assert_eq!(outcome.state, SessionState::WaitForever);
    assert_eq!(outcome.result, SessionResult::Pending);
    assert_eq!(outcome.exit_code(), 0);

    let login = auth.await.expect("auth backend").expect("login request");
    assert_eq!(login["data"]["username"], "operator");

    let rts_login = rts.await.expect("rts backend").expect("rts login request");
    assert_eq!(rts_login["data"]["session_id"], SESSION_ID);
}

#[tokio::test]
async fn rejected_realtime_login_exits_non_zero() {
    let (auth_listener, auth_port) = listener().await;
    let (rts_listener, rts_port) = listener().await;

    let _auth = backend(
        auth_listener,
        json!({ "type": 1, "result": 1, "data": { "session_id": SESSION_ID } }),
        Vec::new(),
    )
    .await;
    let _rts = backend(rts_listener, json!({ "type": 2, "result": 4 }), Vec::new()).await;

    let code = tokio::time::timeout(
        Duration::from_secs(10),
        run_session(&config(auth_port, rts_port, Duration::from_secs(30))),
    )
    .await
    .expect("failed session should stop before the time limit");
    assert_eq!(code, -1);
}

#[tokio::test]
async fn rejected_login_stops_before_realtime_login() {
    let (auth_listener, auth_port) = listener().await;
    let (rts_listener, rts_port) = listener().await;

    let _auth = backend(auth_listener, json!({ "type": 1, "result": 2 }), Vec::new()).await;
    let rts = backend(rts_listener, json!({ "type": 2, "result": 1 }), Vec::new()).await;

    let outcome = drive_session(&config(auth_port, rts_port, Duration::from_secs(30)))
        .await
        .expect("session should run");
    assert_eq!(outcome.state, SessionState::Login);
    assert_eq!(outcome.result, SessionResult::Failed);
    assert!(!outcome.timed_out);

    // The realtime backend never saw a login request.
    let seen = tokio::time::timeout(Duration::from_secs(5), rts)
        .await
        .expect("realtime backend should finish once the client stops")
        .expect("realtime backend task should not panic");
    assert!(seen.is_none());
}

#[tokio::test]
async fn backend_closing_auth_after_login_keeps_session_alive() {
    let (auth_listener, auth_port) = listener().await;
    let (rts_listener, rts_port) = listener().await;

    let auth = closing_backend(
        auth_listener,
        json!({ "type": 1, "result": 1, "data": { "session_id": SESSION_ID } }),
    )
    .await;
    let _rts = backend(
        rts_listener,
        json!({ "type": 2, "result": 1 }),
        startup_frames(0),
    )
    .await;

    let outcome = drive_session(&config(auth_port, rts_port, Duration::from_secs(2)))
        .await
        .expect("session should run");
    assert_eq!(outcome.state, SessionState::WaitForever);
    assert_eq!(outcome.result, SessionResult::Pending);
    assert!(outcome.timed_out);
    assert_eq!(outcome.exit_code(), 0);

    let login = auth.await.expect("auth backend task").expect("login request");
    assert_eq!(login["data"]["username"], "operator");
}
