//! End-to-end tests over real WebSockets.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;

use nakuma_core::{IssueField, RoomKey};
use nakuma_server::{Hub, HubConfig, HubServer};
use nakuma_store::SqliteStore;
use nakuma_store::sqlite::repositories::{IssueRepo, TeamRepo, ViewRepo, WorkspaceRepo};
use nakuma_store::sqlite::{ConnectionConfig, new_in_memory};

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

struct TestServer {
    url: String,
    server: HubServer,
    serve: tokio::task::JoinHandle<()>,
    store: SqliteStore,
}

/// Workspace `w1`, team `t1` with three issues, view `v1` on `t1`.
fn seeded_store() -> SqliteStore {
    let store = SqliteStore::new(new_in_memory(&ConnectionConfig::default()).unwrap());
    let _ = store.migrate().unwrap();
    let conn = store.pool().get().unwrap();
    WorkspaceRepo::create(&conn, "w1", "Acme").unwrap();
    TeamRepo::create(&conn, "t1", "w1", "Core").unwrap();
    for (id, status) in [("i1", "open"), ("i2", "open"), ("i3", "done")] {
        IssueRepo::create(&conn, id, "t1", id).unwrap();
        IssueRepo::set_field(&conn, id, IssueField::Status, status).unwrap();
    }
    ViewRepo::create(&conn, "v1", Some("t1"), "Board").unwrap();
    store
}

async fn boot() -> TestServer {
    let store = seeded_store();
    let hub = Arc::new(Hub::new(Arc::new(store.clone())));
    let server = HubServer::new(HubConfig::default(), hub, None);
    let (addr, serve) = server.listen().await.unwrap();
    TestServer {
        url: format!("ws://{addr}/ws"),
        server,
        serve,
        store,
    }
}

async fn connect(url: &str, user: &str) -> WsStream {
    let mut req = url.into_client_request().unwrap();
    let _ = req
        .headers_mut()
        .insert("x-user-id", HeaderValue::from_str(user).unwrap());
    let (ws, _) = timeout(TIMEOUT, connect_async(req)).await.unwrap().unwrap();
    ws
}

async fn send(ws: &mut WsStream, frame: Value) {
    ws.send(Message::text(frame.to_string())).await.unwrap();
}

/// Next JSON envelope, skipping control frames.
async fn next_event(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .unwrap();
        if msg.is_text() {
            return serde_json::from_str(msg.to_text().unwrap()).unwrap();
        }
    }
}

async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn upgrade_without_identity_is_refused() {
    let ts = boot().await;
    assert!(connect_async(ts.url.as_str()).await.is_err());
}

#[tokio::test]
async fn edits_fan_out_to_every_subscriber() {
    let ts = boot().await;
    let room = RoomKey::new("team", "t1");
    let mut alice = connect(&ts.url, "alice").await;
    let mut bob = connect(&ts.url, "bob").await;

    for ws in [&mut alice, &mut bob] {
        send(ws, json!({"type": "subscribe", "rooms": {"team": ["t1"]}})).await;
    }
    let hub = Arc::clone(ts.server.hub());
    wait_until(|| hub.registry().subscriber_count(&room) == 2).await;

    send(
        &mut bob,
        json!({"type": "update_team", "data": {"team_id": "t1", "name": "Platform", "add_member": "carol"}}),
    )
    .await;

    for ws in [&mut alice, &mut bob] {
        let renamed = next_event(ws).await;
        assert_eq!(renamed["type"], "team_renamed");
        assert_eq!(renamed["data"], json!({"team_id": "t1", "name": "Platform"}));
        let added = next_event(ws).await;
        assert_eq!(added["type"], "team_member_added");
        assert_eq!(added["data"]["user_id"], "carol");
    }

    let conn = ts.store.pool().get().unwrap();
    assert_eq!(TeamRepo::get(&conn, "t1").unwrap().unwrap().name, "Platform");
}

#[tokio::test]
async fn view_edit_rematerializes_and_notifies() {
    let ts = boot().await;
    let mut ws = connect(&ts.url, "alice").await;
    send(&mut ws, json!({"type": "subscribe", "rooms": {"view": ["v1"]}})).await;
    let hub = Arc::clone(ts.server.hub());
    wait_until(|| hub.registry().contains_room(&RoomKey::new("view", "v1"))).await;

    send(
        &mut ws,
        json!({"event": "update_view", "data": {"id": "v1", "group_bys": ["status"]}}),
    )
    .await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["type"], "view_updated");
    assert_eq!(
        event["data"],
        json!({"view_id": "v1", "group_bys": ["status"], "issue_count": 3})
    );

    let conn = ts.store.pool().get().unwrap();
    let mut members = ViewRepo::issues(&conn, "v1").unwrap();
    members.sort();
    assert_eq!(members, vec!["i1", "i2", "i3"]);
    assert_eq!(ViewRepo::group_bys(&conn, "v1").unwrap(), vec!["status"]);
}

#[tokio::test]
async fn malformed_frames_keep_the_connection_open() {
    let ts = boot().await;
    let mut ws = connect(&ts.url, "alice").await;
    ws.send(Message::text("{{{".to_owned())).await.unwrap();
    send(&mut ws, json!({"type": "update_issue", "data": {"title": "no id"}})).await;
    send(&mut ws, json!({"type": "subscribe", "rooms": {"issue": ["i1"]}})).await;
    send(
        &mut ws,
        json!({"type": "update_issue", "data": {"id": "i1", "priority": "urgent"}}),
    )
    .await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["type"], "issue_updated");
    assert_eq!(
        event["data"],
        json!({"issue_id": "i1", "field": "priority", "value": "urgent"})
    );
}

#[tokio::test]
async fn disconnect_releases_every_room() {
    let ts = boot().await;
    let hub = Arc::clone(ts.server.hub());
    let mut ws = connect(&ts.url, "alice").await;
    send(
        &mut ws,
        json!({"type": "subscribe", "rooms": {"workspace": ["w1"], "team": ["t1"], "view": ["v1"]}}),
    )
    .await;
    wait_until(|| hub.registry().room_count() == 3).await;
    assert_eq!(hub.connection_count(), 1);

    ws.close(None).await.unwrap();
    drop(ws);

    wait_until(|| hub.registry().room_count() == 0 && hub.connection_count() == 0).await;
}

#[tokio::test]
async fn drain_closes_sessions_and_waits_for_teardown() {
    let TestServer { url, server, serve, .. } = boot().await;
    let hub = Arc::clone(server.hub());
    let mut ws = connect(&url, "alice").await;
    send(&mut ws, json!({"type": "subscribe", "rooms": {"team": ["t1"], "view": ["v1"]}})).await;
    wait_until(|| hub.registry().room_count() == 2).await;
    assert_eq!(server.shutdown().active_sessions(), 1);

    assert!(server.shutdown().drain(serve, Some(TIMEOUT)).await);

    // Teardown finished before drain returned.
    assert_eq!(hub.registry().room_count(), 0);
    assert_eq!(hub.connection_count(), 0);
    assert_eq!(server.shutdown().active_sessions(), 0);

    let ended = timeout(TIMEOUT, async {
        while let Some(Ok(msg)) = ws.next().await {
            if msg.is_close() {
                break;
            }
        }
    })
    .await;
    assert!(ended.is_ok());
}
