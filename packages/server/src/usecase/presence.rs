//! UseCase: 参加・退出（Presence & Lifecycle Manager）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - PresenceUseCase::join() / leave() / release()
//! - 参加者リスト、participant-joined / participant-left の配信先、Room の破棄
//!
//! ### なぜこのテストが必要か
//! - 同じ接続での再参加が重複エントリや重複通知を生まないことを保証する
//! - 切断後に古い参加者が Room に残らないことを保証する
//! - 最後の参加者が抜けた Room が破棄され、次の参加で既定状態から始まることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加、退出、別プロジェクトへの移動
//! - 冪等性：同じ接続での再参加、未参加の接続の退出
//! - エッジケース：最後の参加者の退出

use std::sync::Arc;

use atelier_shared::time::Clock;

use crate::domain::{
    CollaborationEvent, ConnectionId, ConnectionRegistry, EventPayload, FanOut, Member,
    MessagePusher, OutboundMessage, Participant, ProjectId, RoomRepository, Timestamp,
};

use super::error::PresenceError;

/// 参加処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// 新規に参加した（participant-joined を配信済み）
    Joined,
    /// 同じ接続で参加済みだった（配信なし、スナップショットのみ再送）
    AlreadyJoined,
    /// 参加処理の途中で接続がプロジェクトから外れた（何も追加しない）
    Abandoned,
}

/// 参加・退出のユースケース
pub struct PresenceUseCase {
    /// Room Store
    repository: Arc<dyn RoomRepository>,
    /// Connection Registry
    registry: Arc<dyn ConnectionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl PresenceUseCase {
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

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    /// プロジェクトの Room に参加
    ///
    /// 1. Registry に対応付け（別プロジェクトに参加中ならそちらを先に退出）
    /// 2. Room を取得または作成し、接続 ID のエントリがなければ追加
    /// 3. 新規追加なら他の参加者に participant-joined を配信
    /// 4. 参加者本人にだけ Room のスナップショットを送信
    ///
    /// 2〜4 は Room のロックを保持したまま行う。
    pub async fn join(
        &self,
        project_id: ProjectId,
        participant: Participant,
        connection_id: ConnectionId,
    ) -> Result<JoinOutcome, PresenceError> {
        if let Some(previous) = self
            .registry
            .associate(&connection_id, &project_id)
            .await?
        {
            tracing::info!(
                "Connection '{}' moves from '{}' to '{}'",
                connection_id,
                previous,
                project_id
            );
            self.release(&previous, &connection_id).await;
        }

        loop {
            let now = self.now();
            let shared = self.repository.get_or_create(&project_id, now).await;
            let mut room = shared.lock().await;
            if room.is_closed() {
                // 取得直後に破棄された。作り直す
                continue;
            }

            // Room のロック下で対応付けを再確認する。
            // 参加処理の途中で切断された接続を Room に残さない
            if self.registry.project_of(&connection_id).await.as_ref() != Some(&project_id) {
                tracing::info!(
                    "Connection '{}' left '{}' while joining; join abandoned",
                    connection_id,
                    project_id
                );
                drop(room);
                self.repository.remove(&project_id).await;
                return Ok(JoinOutcome::Abandoned);
            }

            let member = Member::new(connection_id.clone(), participant.clone(), now);
            let outcome = if room.add_member(member.clone()) {
                let targets = room.fan_out_targets(&connection_id, FanOut::Others);
                let event = CollaborationEvent::new(
                    project_id.clone(),
                    connection_id.clone(),
                    EventPayload::ParticipantJoined(member),
                    now,
                );
                if let Err(e) = self
                    .message_pusher
                    .broadcast(&targets, &OutboundMessage::Event(event))
                    .await
                {
                    tracing::warn!("Failed to broadcast participant-joined: {}", e);
                }
                tracing::info!(
                    "'{}' ({}) joined '{}' via '{}' ({} participants)",
                    participant.name,
                    participant.role,
                    project_id,
                    connection_id,
                    room.member_count()
                );
                JoinOutcome::Joined
            } else {
                tracing::debug!(
                    "Connection '{}' already joined '{}', resending room state only",
                    connection_id,
                    project_id
                );
                JoinOutcome::AlreadyJoined
            };

            if let Err(e) = self
                .message_pusher
                .push_to(&connection_id, &OutboundMessage::RoomState(room.clone()))
                .await
            {
                tracing::warn!("Failed to send room state to '{}': {}", connection_id, e);
            }

            return Ok(outcome);
        }
    }

    /// クライアントの明示的な退出
    ///
    /// 接続が別のプロジェクトに参加中なら何もしない。
    pub async fn leave(
        &self,
        project_id: &ProjectId,
        connection_id: &ConnectionId,
    ) -> Option<Member> {
        match self.registry.project_of(connection_id).await {
            Some(current) if &current == project_id => {
                self.registry.dissociate(connection_id).await;
            }
            Some(current) => {
                tracing::debug!(
                    "Ignoring leave of '{}' from '{}': connection is in '{}'",
                    project_id,
                    connection_id,
                    current
                );
                return None;
            }
            None => {}
        }
        self.release(project_id, connection_id).await
    }

    /// 接続のエントリを Room から取り除く（退出ハンドラ）
    ///
    /// 明示的な退出と切断の両方から呼ばれる。エントリがなければ何もしない。
    /// 残った参加者に participant-left を配信し、Room が空になれば Store から削除する。
    pub async fn release(
        &self,
        project_id: &ProjectId,
        connection_id: &ConnectionId,
    ) -> Option<Member> {
        let shared = self.repository.get(project_id).await?;

        let removed = {
            let mut room = shared.lock().await;
            if room.is_closed() {
                return None;
            }
            let removed = room.remove_member(connection_id)?;

            let targets = room.connection_ids();
            let event = CollaborationEvent::new(
                project_id.clone(),
                connection_id.clone(),
                EventPayload::ParticipantLeft(removed.clone()),
                self.now(),
            );
            if let Err(e) = self
                .message_pusher
                .broadcast(&targets, &OutboundMessage::Event(event))
                .await
            {
                tracing::warn!("Failed to broadcast participant-left: {}", e);
            }
            tracing::info!(
                "'{}' left '{}' ({} participants remain)",
                removed.participant.name,
                project_id,
                room.member_count()
            );
            removed
        };

        self.repository.remove(project_id).await;

        Some(removed)
    }
}
