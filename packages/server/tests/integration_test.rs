//! Integration tests for the chat relay, running the server in-process.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use hiroba_server::{
    config::ServerConfig,
    infrastructure::{
        dto::http::{RoomDetailDto, RoomSummaryDto},
        registry::InMemoryRoomRegistry,
    },
    ui::{Server, state::AppState},
};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Start a server on an ephemeral port and return its address
async fn start_server(config: ServerConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let registry = Arc::new(InMemoryRoomRegistry::new());
    let server = Server::new(AppState::new(registry, &config));
    tokio::spawn(async move {
        server
            .serve(listener, std::future::pending())
            .await
            .unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr, room: &str) -> Client {
    let url = format!("ws://{}/ws/chat/{}", addr, room);
    let (client, _) = connect_async(url).await.unwrap();
    client
}

async fn send_chat(client: &mut Client, message: &str) {
    let frame = serde_json::json!({ "message": message }).to_string();
    client.send(Message::Text(frame.into())).await.unwrap();
}

/// Next chat message, or `None` on close / timeout
async fn next_chat(client: &mut Client, wait: Duration) -> Option<String> {
    loop {
        let frame = tokio::time::timeout(wait, client.next()).await.ok()??;
        match frame.ok()? {
            Message::Text(text) => {
                let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
                return Some(value["message"].as_str().unwrap().to_string());
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            _ => return None,
        }
    }
}

/// Whether the server closes the connection within `wait`
async fn is_closed_by_server(client: &mut Client, wait: Duration) -> bool {
    loop {
        match tokio::time::timeout(wait, client.next()).await {
            Err(_) => return false,
            Ok(None) | Ok(Some(Err(_))) | Ok(Some(Ok(Message::Close(_)))) => return true,
            Ok(Some(Ok(_))) => continue,
        }
    }
}

async fn get_rooms(addr: SocketAddr) -> Vec<RoomSummaryDto> {
    reqwest::get(format!("http://{}/api/rooms", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

/// Poll the rooms API until `room` has `count` members (0 = room absent)
async fn wait_for_members(addr: SocketAddr, room: &str, count: usize) {
    for _ in 0..100 {
        let rooms = get_rooms(addr).await;
        let current = rooms
            .iter()
            .find(|r| r.name == room)
            .map(|r| r.member_count)
            .unwrap_or(0);
        if current == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("room '{}' never reached {} members", room, count);
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが ok を返す
    // given (前提条件):
    let addr = start_server(ServerConfig::default()).await;

    // when (操作):
    let body: serde_json::Value = reqwest::get(format!("http://{}/api/health", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(body, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_message_is_relayed_to_every_member_including_sender() {
    // テスト項目: 送信されたメッセージが送信者を含む同じ Room の全員に届く
    // given (前提条件):
    let addr = start_server(ServerConfig::default()).await;
    let mut alice = connect(addr, "lobby").await;
    let mut bob = connect(addr, "lobby").await;
    wait_for_members(addr, "lobby", 2).await;

    // when (操作):
    send_chat(&mut alice, "hi").await;

    // then (期待する結果):
    let wait = Duration::from_secs(2);
    assert_eq!(next_chat(&mut alice, wait).await.as_deref(), Some("hi"));
    assert_eq!(next_chat(&mut bob, wait).await.as_deref(), Some("hi"));
}

#[tokio::test]
async fn test_exclude_sender_skips_echo() {
    // テスト項目: --exclude-sender の場合は送信者にメッセージが返らない
    // given (前提条件):
    let config = ServerConfig {
        exclude_sender: true,
        ..ServerConfig::default()
    };
    let addr = start_server(config).await;
    let mut alice = connect(addr, "lobby").await;
    let mut bob = connect(addr, "lobby").await;
    wait_for_members(addr, "lobby", 2).await;

    // when (操作):
    send_chat(&mut alice, "hi").await;

    // then (期待する結果):
    assert_eq!(
        next_chat(&mut bob, Duration::from_secs(2)).await.as_deref(),
        Some("hi")
    );
    assert_eq!(next_chat(&mut alice, Duration::from_millis(300)).await, None);
}

#[tokio::test]
async fn test_messages_do_not_cross_rooms() {
    // テスト項目: 別の Room のメンバーにはメッセージが届かない
    // given (前提条件):
    let addr = start_server(ServerConfig::default()).await;
    let mut alice = connect(addr, "lobby").await;
    let mut carol = connect(addr, "dev").await;
    wait_for_members(addr, "lobby", 1).await;
    wait_for_members(addr, "dev", 1).await;

    // when (操作):
    send_chat(&mut alice, "lobby only").await;

    // then (期待する結果):
    assert_eq!(
        next_chat(&mut alice, Duration::from_secs(2)).await.as_deref(),
        Some("lobby only")
    );
    assert_eq!(next_chat(&mut carol, Duration::from_millis(300)).await, None);
}

#[tokio::test]
async fn test_malformed_frame_closes_connection() {
    // テスト項目: 不正な JSON を送った接続は閉じられ、他のメンバーには何も届かない
    // given (前提条件):
    let addr = start_server(ServerConfig::default()).await;
    let mut alice = connect(addr, "lobby").await;
    let mut bob = connect(addr, "lobby").await;
    wait_for_members(addr, "lobby", 2).await;

    // when (操作):
    alice.send(Message::Text("not-json".into())).await.unwrap();

    // then (期待する結果):
    assert!(is_closed_by_server(&mut alice, Duration::from_secs(2)).await);
    wait_for_members(addr, "lobby", 1).await;
    assert_eq!(next_chat(&mut bob, Duration::from_millis(300)).await, None);
}

#[tokio::test]
async fn test_binary_frame_closes_connection() {
    // テスト項目: バイナリフレームを送った接続は閉じられる
    // given (前提条件):
    let addr = start_server(ServerConfig::default()).await;
    let mut alice = connect(addr, "lobby").await;
    wait_for_members(addr, "lobby", 1).await;

    // when (操作):
    alice.send(Message::Binary(vec![1u8, 2, 3].into())).await.unwrap();

    // then (期待する結果):
    assert!(is_closed_by_server(&mut alice, Duration::from_secs(2)).await);
    wait_for_members(addr, "lobby", 0).await;
}

#[tokio::test]
async fn test_invalid_room_name_is_rejected_before_upgrade() {
    // テスト項目: 不正なルーム名への接続は 400 で拒否され、Room は作られない
    // given (前提条件):
    let addr = start_server(ServerConfig::default()).await;

    // when (操作):
    let result = connect_async(format!("ws://{}/ws/chat/bad%20room!", addr)).await;

    // then (期待する結果):
    match result {
        Err(tokio_tungstenite::tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), 400);
        }
        other => panic!("expected HTTP 400, got {:?}", other.map(|_| ())),
    }
    assert!(get_rooms(addr).await.is_empty());
}

#[tokio::test]
async fn test_rooms_api_lists_active_rooms() {
    // テスト項目: Room 一覧が名前順で、メンバー数とともに返る
    // given (前提条件):
    let addr = start_server(ServerConfig::default()).await;
    let _alice = connect(addr, "lobby").await;
    let _bob = connect(addr, "lobby").await;
    let _carol = connect(addr, "dev").await;
    wait_for_members(addr, "lobby", 2).await;
    wait_for_members(addr, "dev", 1).await;

    // when (操作):
    let rooms = get_rooms(addr).await;
    let detail: RoomDetailDto = reqwest::get(format!("http://{}/api/rooms/lobby", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    let names: Vec<(&str, usize)> = rooms
        .iter()
        .map(|r| (r.name.as_str(), r.member_count))
        .collect();
    assert_eq!(names, vec![("dev", 1), ("lobby", 2)]);
    assert_eq!(detail.name, "lobby");
    assert_eq!(detail.members.len(), 2);
}

#[tokio::test]
async fn test_room_detail_status_codes() {
    // テスト項目: 存在しない Room は 404、不正な名前は 400 を返す
    // given (前提条件):
    let addr = start_server(ServerConfig::default()).await;

    // when (操作):
    let missing = reqwest::get(format!("http://{}/api/rooms/missing", addr))
        .await
        .unwrap();
    let invalid = reqwest::get(format!("http://{}/api/rooms/bad%20room", addr))
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(missing.status().as_u16(), 404);
    assert_eq!(invalid.status().as_u16(), 400);
}

#[tokio::test]
async fn test_room_is_deleted_after_last_member_leaves() {
    // テスト項目: 最後のメンバーが退出すると Room が削除され、再接続で作り直される
    // given (前提条件):
    let addr = start_server(ServerConfig::default()).await;
    let mut alice = connect(addr, "lobby").await;
    wait_for_members(addr, "lobby", 1).await;

    // when (操作):
    alice.close(None).await.unwrap();

    // then (期待する結果):
    wait_for_members(addr, "lobby", 0).await;
    assert!(get_rooms(addr).await.is_empty());

    let mut bob = connect(addr, "lobby").await;
    wait_for_members(addr, "lobby", 1).await;
    send_chat(&mut bob, "back").await;
    assert_eq!(
        next_chat(&mut bob, Duration::from_secs(2)).await.as_deref(),
        Some("back")
    );
}
