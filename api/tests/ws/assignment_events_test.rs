use crate::helpers::{TestApp, connect_ws, make_test_app, spawn_server};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use serial_test::serial;
use services::{AssignmentHost, Caller};
use tokio::time::{Duration, timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Next text frame as JSON, skipping control frames.
async fn next_json(ws: &mut Socket) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Round-trips an app ping so the server side is known to be subscribed.
async fn handshake(ws: &mut Socket) {
    ws.send(Message::Text(json!({ "type": "ping" }).to_string().into()))
        .await
        .unwrap();
    let pong = next_json(ws).await;
    assert_eq!(pong["event"], "pong");
}

async fn serve(app: &TestApp) -> String {
    spawn_server(app.app.clone()).await.to_string()
}

#[tokio::test]
#[serial]
async fn teacher_sees_saves_and_hand_in_live() {
    let app = make_test_app().await;
    let id = app.seed.assignment.id;
    let addr = serve(&app).await;

    let (mut ws, _) = connect_ws(&addr, &format!("assignments/{id}"), &app.teacher_token())
        .await
        .unwrap();
    handshake(&mut ws).await;

    let host = AssignmentHost::from_state(&app.state);
    let student = Caller::student(app.seed.student.id);
    let body = json!({
        "type": "SAVE_WORKSHEET_DATA",
        "payload": { "inputs": { "q1": "RAM" } }
    })
    .to_string();
    host.receive_message(&student, id, body.as_bytes()).await.unwrap();

    let saved = next_json(&mut ws).await;
    assert_eq!(saved["type"], "event");
    assert_eq!(saved["event"], "work_saved");
    assert_eq!(saved["topic"], format!("assignment:{id}"));

    host.hand_in(&student, id).await.unwrap();
    let handed_in = next_json(&mut ws).await;
    assert_eq!(handed_in["event"], "handed_in");
    assert_eq!(handed_in["payload"]["status"], "handed_in");
}

#[tokio::test]
#[serial]
async fn presence_is_tracked_per_socket() {
    let app = make_test_app().await;
    let id = app.seed.assignment.id;
    let addr = serve(&app).await;
    let path = format!("assignments/{id}");
    let topic = util::ws::assignment_topic(id);

    let (mut first, _) = connect_ws(&addr, &path, &app.student_token()).await.unwrap();
    handshake(&mut first).await;
    let (mut second, _) = connect_ws(&addr, &path, &app.student_token()).await.unwrap();
    handshake(&mut second).await;

    let sessions = app.state.ws().sessions_for(&topic, app.seed.student.id).await;
    assert_eq!(sessions, 2);

    second.close(None).await.unwrap();
    let mut remaining = sessions;
    for _ in 0..20 {
        remaining = app.state.ws().sessions_for(&topic, app.seed.student.id).await;
        if remaining == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert_eq!(remaining, 1);
}

#[tokio::test]
#[serial]
async fn upgrade_is_refused_for_strangers_and_missing_tokens() {
    let app = make_test_app().await;
    let id = app.seed.assignment.id;
    let addr = serve(&app).await;
    let path = format!("assignments/{id}");

    assert!(connect_ws(&addr, &path, &app.other_student_token()).await.is_err());
    assert!(connect_ws(&addr, &path, "garbage").await.is_err());
}
