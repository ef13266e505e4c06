//! UseCase: 接続の登録・切断
//!
//! Connection Registry 側の操作。切断時は Registry から外したプロジェクトを
//! Presence の退出ハンドラに渡し、Room に古い参加者が残らないようにします。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, Member, MessagePusher, OutboundMessage, PusherChannel,
};

use super::presence::PresenceUseCase;

/// 接続ライフサイクルのユースケース
pub struct ConnectionUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    presence: Arc<PresenceUseCase>,
}

impl ConnectionUseCase {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        presence: Arc<PresenceUseCase>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            presence,
        }
    }

    /// 新しい接続を登録し、送信チャンネルを MessagePusher に登録する
    ///
    /// 接続 ID は `connected` メッセージで本人に通知する。
    pub async fn register(&self, sender: PusherChannel) -> ConnectionId {
        let connection_id = self.registry.register().await;
        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;

        if let Err(e) = self
            .message_pusher
            .push_to(
                &connection_id,
                &OutboundMessage::Connected(connection_id.clone()),
            )
            .await
        {
            tracing::warn!("Failed to greet connection '{}': {}", connection_id, e);
        }

        tracing::info!(
            "Connection '{}' registered ({} live)",
            connection_id,
            self.registry.count().await
        );
        connection_id
    }

    /// プロジェクトとの対応付けを解除し、Room から取り除く
    ///
    /// 未参加の接続なら何もしない。
    pub async fn dissociate(&self, connection_id: &ConnectionId) -> Option<Member> {
        let project_id = self.registry.dissociate(connection_id).await?;
        self.presence.release(&project_id, connection_id).await
    }

    /// 切断された接続を削除
    ///
    /// 先に `dissociate` で Room から取り除き、その後 Registry と MessagePusher から外す。
    pub async fn deregister(&self, connection_id: &ConnectionId) -> Option<Member> {
        let left = self.dissociate(connection_id).await;
        self.registry.deregister(connection_id).await;
        self.message_pusher.unregister_client(connection_id).await;

        tracing::info!(
            "Connection '{}' deregistered ({} live)",
            connection_id,
            self.registry.count().await
        );
        left
    }
}
