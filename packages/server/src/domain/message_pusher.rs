//! MessagePusher trait 定義
//!
//! クライアントへのメッセージ通知のインターフェース。
//! 配信は fire-and-forget で、確認応答・再送・背圧はありません。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, OutboundMessage};

/// 接続ごとの送信チャンネル（シリアライズ済み JSON）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを削除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続に送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        message: &OutboundMessage,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続に送信（一部の失敗は許容）
    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        message: &OutboundMessage,
    ) -> Result<(), MessagePushError>;
}
