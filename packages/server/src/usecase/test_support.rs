//! UseCase テスト用のフェイク

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use atelier_shared::time::FixedClock;

use crate::{
    domain::{
        ConnectionId, EventKind, MessagePushError, MessagePusher, OutboundMessage, PusherChannel,
    },
    infrastructure::repository::{InMemoryConnectionRegistry, InMemoryRoomRepository},
};

use super::{ConnectionUseCase, PresenceUseCase, RouteEventUseCase};

pub const NOW: i64 = 1_700_000_000_000;

/// 送信内容を記録するだけの MessagePusher
#[derive(Default)]
pub struct RecordingPusher {
    /// (宛先, メッセージ)
    pub sent: Mutex<Vec<(ConnectionId, OutboundMessage)>>,
}

impl RecordingPusher {
    /// 指定の接続が受け取ったメッセージ
    pub fn received_by(&self, connection_id: &ConnectionId) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to == connection_id)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// 指定の接続が受け取ったイベントの種別
    pub fn event_kinds_for(&self, connection_id: &ConnectionId) -> Vec<EventKind> {
        self.received_by(connection_id)
            .into_iter()
            .filter_map(|message| match message {
                OutboundMessage::Event(event) => Some(event.kind()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl MessagePusher for RecordingPusher {
    async fn register_client(&self, _connection_id: ConnectionId, _sender: PusherChannel) {}

    async fn unregister_client(&self, _connection_id: &ConnectionId) {}

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        message: &OutboundMessage,
    ) -> Result<(), MessagePushError> {
        self.sent
            .lock()
            .unwrap()
            .push((connection_id.clone(), message.clone()));
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        message: &OutboundMessage,
    ) -> Result<(), MessagePushError> {
        let mut sent = self.sent.lock().unwrap();
        for target in targets {
            sent.push((target.clone(), message.clone()));
        }
        Ok(())
    }
}

/// 1 テスト分の依存一式
pub struct Harness {
    pub repository: Arc<InMemoryRoomRepository>,
    pub registry: Arc<InMemoryConnectionRegistry>,
    pub pusher: Arc<RecordingPusher>,
    pub presence: Arc<PresenceUseCase>,
    pub connection: ConnectionUseCase,
    pub router: RouteEventUseCase,
}

impl Harness {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let pusher = Arc::new(RecordingPusher::default());
        let clock = Arc::new(FixedClock::new(NOW));
        let presence = Arc::new(PresenceUseCase::new(
            repository.clone(),
            registry.clone(),
            pusher.clone(),
            clock.clone(),
        ));
        let connection = ConnectionUseCase::new(registry.clone(), pusher.clone(), presence.clone());
        let router = RouteEventUseCase::new(
            repository.clone(),
            registry.clone(),
            pusher.clone(),
            clock,
        );
        Self {
            repository,
            registry,
            pusher,
            presence,
            connection,
            router,
        }
    }

    /// 接続を登録（送信チャンネルは捨てる）
    pub async fn connect(&self) -> ConnectionId {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        self.connection.register(tx).await
    }
}
