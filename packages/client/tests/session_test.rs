//! Session facade tests against an in-process collaboration server.

use std::{sync::Arc, time::Duration};

use atelier_client::{CollaborationSession, MirroredState};
use atelier_server::{
    app::build_server,
    domain::{DisplayName, Participant, ParticipantId, ProjectId, Role},
};
use atelier_shared::time::SystemClock;
use tokio::{net::TcpListener, sync::oneshot};

const WAIT_TIMEOUT: Duration = Duration::from_secs(3);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Helper struct to manage the in-process server lifecycle
struct TestServer {
    port: u16,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server = build_server(Arc::new(SystemClock));
        tokio::spawn(async move {
            let _ = server
                .serve(listener, async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        TestServer {
            port,
            shutdown: Some(shutdown_tx),
        }
    }

    fn session(&self) -> CollaborationSession {
        CollaborationSession::new(format!("ws://127.0.0.1:{}/ws", self.port))
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

fn participant(id: &str, name: &str) -> Participant {
    Participant::new(
        ParticipantId::new(id.to_string()).unwrap(),
        DisplayName::new(name.to_string()).unwrap(),
        Role::Designer,
        None,
    )
}

fn project(id: &str) -> ProjectId {
    ProjectId::new(id.to_string()).unwrap()
}

/// Poll the mirror until `predicate` holds
async fn wait_until<F>(session: &CollaborationSession, predicate: F) -> MirroredState
where
    F: Fn(&MirroredState) -> bool,
{
    let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
    loop {
        let snapshot = session.snapshot().await;
        if predicate(&snapshot) {
            return snapshot;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met, mirror: {:?}",
            snapshot
        );
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// A と B が P1 に参加し、お互いを認識した状態
async fn two_joined(server: &TestServer) -> (CollaborationSession, CollaborationSession) {
    let a = server.session();
    let b = server.session();
    a.join(&project("P1"), &participant("u1", "Alice"))
        .await
        .unwrap();
    wait_until(&a, |m| m.participants().len() == 1).await;
    b.join(&project("P1"), &participant("u2", "Bob"))
        .await
        .unwrap();
    wait_until(&a, |m| m.participants().len() == 2).await;
    wait_until(&b, |m| m.participants().len() == 2).await;
    (a, b)
}

#[tokio::test]
async fn test_join_mirrors_room_state() {
    // テスト項目: 参加すると接続状態・接続 ID・参加者一覧・既定の共有状態がミラーされる
    // given (前提条件):
    let server = TestServer::start().await;
    let a = server.session();

    // when (操作):
    a.join(&project("P1"), &participant("u1", "Alice"))
        .await
        .unwrap();

    // then (期待する結果):
    let mirror = wait_until(&a, |m| m.participants().len() == 1).await;
    assert!(mirror.is_connected());
    assert_eq!(mirror.project_id(), Some("P1"));
    assert_eq!(
        mirror.participants()[0].connection_id,
        mirror.connection_id().unwrap()
    );
    assert_eq!(mirror.shared_state().zoom_level, 1.0);
    assert_eq!(mirror.shared_state().view_mode, "2d");
    assert!(mirror.active_tools().is_empty());
}

#[tokio::test]
async fn test_view_change_reaches_other_mirror() {
    // テスト項目: A の view_change は B のミラーに反映され、A は楽観的に適用済み
    // given (前提条件):
    let server = TestServer::start().await;
    let (a, b) = two_joined(&server).await;

    // when (操作):
    a.emit_view_change(2.0, "3d").await;

    // then (期待する結果):
    let local = a.shared_state().await;
    assert_eq!(local.zoom_level, 2.0);
    assert_eq!(local.view_mode, "3d");

    let remote = wait_until(&b, |m| m.shared_state().view_mode == "3d").await;
    assert_eq!(remote.shared_state().zoom_level, 2.0);
}

#[tokio::test]
async fn test_chat_appears_once_in_every_transcript() {
    // テスト項目: チャットは送信者を含む全員の履歴にちょうど 1 回現れる
    // given (前提条件):
    let server = TestServer::start().await;
    let (a, b) = two_joined(&server).await;

    // when (操作):
    a.emit_chat("hi").await;

    // then (期待する結果):
    for session in [&a, &b] {
        wait_until(session, |m| !m.chat_transcript().is_empty()).await;
    }
    tokio::time::sleep(Duration::from_millis(200)).await;
    for session in [&a, &b] {
        let transcript = session.chat_transcript().await;
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].text, "hi");
        assert_eq!(transcript[0].sender.name, "Alice");
    }
}

#[tokio::test]
async fn test_tools_and_cursor_reach_other_mirror() {
    // テスト項目: ツール選択とカーソル移動が相手のミラーに反映される
    // given (前提条件):
    let server = TestServer::start().await;
    let (a, b) = two_joined(&server).await;
    let a_connection_id = a.connection_id().await.unwrap();

    // when (操作):
    a.emit_tool_select("pen").await;
    a.emit_cursor(12.0, 34.0).await;

    // then (期待する結果):
    let mirror = wait_until(&b, |m| m.cursors().contains_key(&a_connection_id)).await;
    assert_eq!(mirror.active_tools(), ["pen".to_string()]);
    let cursor = mirror.cursors()[&a_connection_id];
    assert_eq!((cursor.x, cursor.y), (12.0, 34.0));
    assert!(a.cursors().await.is_empty());
}

#[tokio::test]
async fn test_abrupt_disconnect_updates_other_mirror() {
    // テスト項目: A の切断後、B のミラーと Room の状態には B だけが残る
    // given (前提条件):
    let server = TestServer::start().await;
    let (a, b) = two_joined(&server).await;

    // when (操作):
    drop(a);

    // then (期待する結果):
    let mirror = wait_until(&b, |m| m.participants().len() == 1).await;
    assert_eq!(mirror.participants()[0].participant.name, "Bob");

    let detail: serde_json::Value = reqwest::get(server.http_url("/api/rooms/P1"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let participants = detail["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["participant"]["name"], "Bob");
}

#[tokio::test]
async fn test_leave_stops_mirroring() {
    // テスト項目: 退出後はそのプロジェクトのイベントを適用しない
    // given (前提条件):
    let server = TestServer::start().await;
    let (a, b) = two_joined(&server).await;

    // when (操作):
    b.leave(&project("P1")).await;
    wait_until(&a, |m| m.participants().len() == 1).await;
    a.emit_tool_select("measure").await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    // then (期待する結果):
    assert_eq!(b.project_id().await, None);
    assert!(b.active_tools().await.is_empty());
    assert!(b.is_connected().await);
}

#[tokio::test]
async fn test_emit_before_join_is_dropped() {
    // テスト項目: 参加前の emit は送信されずに捨てられる
    // given (前提条件):
    let server = TestServer::start().await;
    let a = server.session();
    a.connect().await.unwrap();

    // when (操作):
    a.emit_tool_select("pen").await;

    // then (期待する結果):
    assert!(a.active_tools().await.is_empty());
    wait_until(&a, |m| m.connection_id().is_some()).await;
}
