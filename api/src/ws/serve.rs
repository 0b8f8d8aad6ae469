use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::{sync::mpsc, time};
use util::ws::WebSocketManager;

pub struct WsServerOptions {
    pub ws_ping_sec: u64,
    pub enable_app_ping: bool,
}

impl Default for WsServerOptions {
    fn default() -> Self {
        Self {
            ws_ping_sec: 30,
            enable_app_ping: true,
        }
    }
}

/// Streams every broadcast on `topic` to the socket until the client leaves.
///
/// Client frames are only used for liveness: `{"type":"ping"}` is answered
/// with a `pong` event, WS pings with pongs. Presence is tracked for `user_id`.
pub async fn serve_topic(
    socket: WebSocket,
    manager: WebSocketManager,
    topic: String,
    user_id: Option<i64>,
    opts: WsServerOptions,
) {
    let mut rx = manager.subscribe(&topic).await;
    if let Some(uid) = user_id {
        manager.register(&topic, uid).await;
    }

    let (mut sink, mut socket_rx) = socket.split();

    // Outbound queue and writer task
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(64);
    let writer_task = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if sink.send(frame).await.is_err() {
                break;
            }
        }
    });

    // S→C: forward broadcasts on this topic
    let forward_task = {
        let out_tx = out_tx.clone();
        let topic = topic.clone();
        tokio::spawn(async move {
            while let Ok(msg) = rx.recv().await {
                if out_tx.send(Message::Text(msg.into())).await.is_err() {
                    tracing::info!(topic = %topic, "client disconnected while sending");
                    break;
                }
            }
        })
    };

    let ping_task = {
        let out_tx = out_tx.clone();
        tokio::spawn(async move {
            loop {
                time::sleep(std::time::Duration::from_secs(opts.ws_ping_sec)).await;
                if out_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        })
    };

    // C→S
    while let Some(Ok(msg)) = socket_rx.next().await {
        match msg {
            Message::Text(text) => {
                if opts.enable_app_ping && is_app_ping(text.as_str()) {
                    let pong = serde_json::json!({
                        "event": "pong",
                        "topic": topic,
                        "payload": {},
                        "ts": Utc::now().to_rfc3339(),
                    })
                    .to_string();
                    let _ = out_tx.send(Message::Text(pong.into())).await;
                } else {
                    tracing::debug!(topic = %topic, "ignoring client message");
                }
            }
            Message::Ping(payload) => {
                let _ = out_tx.send(Message::Pong(payload)).await;
            }
            Message::Pong(_) => {}
            Message::Binary(_) => {
                tracing::warn!(topic = %topic, "ignoring binary frame");
            }
            Message::Close(_) => break,
        }
    }

    forward_task.abort();
    ping_task.abort();
    drop(out_tx);
    let _ = writer_task.await;

    if let Some(uid) = user_id {
        manager.unregister(&topic, uid).await;
    }
    tracing::info!(topic = %topic, "WS session ended");
}

fn is_app_ping(raw: &str) -> bool {
    matches!(
        serde_json::from_str::<Value>(raw),
        Ok(Value::Object(map)) if map.get("type").and_then(Value::as_str) == Some("ping")
    )
}
