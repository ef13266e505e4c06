//! UseCase: イベントルーティング（Event Router）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RouteEventUseCase::execute()
//! - 種別ごとの状態変更とファンアウト先（送信元を含むか）
//!
//! ### なぜこのテストが必要か
//! - カーソル移動が送信元に返らないこと、チャットが送信元にも返ることを保証する
//! - 未参加の接続や破棄済み Room へのイベントが何も配信しないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：各種イベントの適用と配信
//! - 異常系：未参加の接続、別プロジェクト宛てのイベント、破棄済みの Room

use std::sync::Arc;

use atelier_shared::time::Clock;

use crate::domain::{
    ClientEvent, CollaborationEvent, ConnectionId, ConnectionRegistry, MessagePusher,
    OutboundMessage, ProjectId, RoomRepository, Timestamp,
};

use super::error::RouteError;

/// イベントルーティングのユースケース
pub struct RouteEventUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl RouteEventUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            message_pusher,
            clock,
        }
    }

    /// イベントを Room に適用してファンアウト
    ///
    /// 変更と配信は Room のロックを保持したまま行うため、スナップショットの読み手が
    /// 配信前の状態変更を観測することはない。Room は作成しない。
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - 配信先の接続 ID
    /// * `Err(RouteError)` - イベントを破棄した理由
    pub async fn execute(
        &self,
        origin: &ConnectionId,
        project_id: &ProjectId,
        event: ClientEvent,
    ) -> Result<Vec<ConnectionId>, RouteError> {
        let not_joined = || RouteError::NotJoined {
            connection_id: origin.to_string(),
            project_id: project_id.to_string(),
        };

        match self.registry.project_of(origin).await {
            Some(current) if &current == project_id => {}
            _ => return Err(not_joined()),
        }

        let shared = self
            .repository
            .get(project_id)
            .await
            .ok_or_else(|| RouteError::RoomGone(project_id.to_string()))?;
        let mut room = shared.lock().await;
        if room.is_closed() {
            return Err(RouteError::RoomGone(project_id.to_string()));
        }

        let now = Timestamp::new(self.clock.now_millis());
        let payload = room.apply(origin, event, now).ok_or_else(not_joined)?;
        let targets = room.fan_out_targets(origin, payload.fan_out());
        let event = CollaborationEvent::new(project_id.clone(), origin.clone(), payload, now);
        tracing::debug!(
            "Routing {} from '{}' in '{}' to {} connection(s)",
            event.kind(),
            origin,
            project_id,
            targets.len()
        );

        self.message_pusher
            .broadcast(&targets, &OutboundMessage::Event(event))
            .await?;

        Ok(targets)
    }
}
