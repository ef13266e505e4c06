//! Collaboration events
//!
//! クライアントからの入力（`ClientEvent`）と、Room に適用された結果としてファンアウトされる
//! イベント（`CollaborationEvent`）をそれぞれ閉じた enum で表現します。
//! イベントは永続化されず、ルーティングと配信の間だけ存在します。

use std::fmt;

use super::{
    entity::{Member, Participant, Room},
    value_object::{
        ChatText, ConnectionId, CursorPosition, ElementId, ProjectId, Timestamp, ToolName,
        UpdateType, ViewMode, ZoomLevel,
    },
};

/// 参加後にクライアントが送るイベント（検証済み）
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    CursorMove(CursorPosition),
    ToolSelect(ToolName),
    /// `None` は選択解除
    ElementSelect(Option<ElementId>),
    ViewChange {
        zoom_level: ZoomLevel,
        view_mode: ViewMode,
    },
    Chat(ChatText),
    DesignUpdate {
        update_type: UpdateType,
        update_data: serde_json::Value,
    },
}

/// ファンアウト先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOut {
    /// 送信元以外の参加者
    Others,
    /// 送信元を含む全参加者
    All,
}

/// イベント種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ParticipantJoined,
    ParticipantLeft,
    CursorMoved,
    ToolSelected,
    ElementSelected,
    ViewChanged,
    ChatMessage,
    DesignUpdate,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ParticipantJoined => "participant-joined",
            EventKind::ParticipantLeft => "participant-left",
            EventKind::CursorMoved => "cursor-moved",
            EventKind::ToolSelected => "tool-selected",
            EventKind::ElementSelected => "element-selected",
            EventKind::ViewChanged => "view-changed",
            EventKind::ChatMessage => "chat-message",
            EventKind::DesignUpdate => "design-update",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// チャットメッセージ（サーバー側では保持しない）
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub sender: Participant,
    pub text: ChatText,
    pub timestamp: Timestamp,
}

/// 種別ごとのペイロード
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    ParticipantJoined(Member),
    /// 削除された参加者の最後の識別情報
    ParticipantLeft(Member),
    CursorMoved(CursorPosition),
    ToolSelected(ToolName),
    ElementSelected(Option<ElementId>),
    ViewChanged {
        zoom_level: ZoomLevel,
        view_mode: ViewMode,
    },
    ChatMessage(ChatMessage),
    DesignUpdate {
        update_type: UpdateType,
        update_data: serde_json::Value,
    },
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::ParticipantJoined(_) => EventKind::ParticipantJoined,
            EventPayload::ParticipantLeft(_) => EventKind::ParticipantLeft,
            EventPayload::CursorMoved(_) => EventKind::CursorMoved,
            EventPayload::ToolSelected(_) => EventKind::ToolSelected,
            EventPayload::ElementSelected(_) => EventKind::ElementSelected,
            EventPayload::ViewChanged { .. } => EventKind::ViewChanged,
            EventPayload::ChatMessage(_) => EventKind::ChatMessage,
            EventPayload::DesignUpdate { .. } => EventKind::DesignUpdate,
        }
    }

    /// ルーティング表
    ///
    /// チャットだけは送信元にも届ける（送信者の UI が配信を確認できるように）。
    pub fn fan_out(&self) -> FanOut {
        match self {
            EventPayload::ChatMessage(_) => FanOut::All,
            _ => FanOut::Others,
        }
    }
}

/// ファンアウトされるイベント
#[derive(Debug, Clone, PartialEq)]
pub struct CollaborationEvent {
    pub project_id: ProjectId,
    pub origin: ConnectionId,
    pub payload: EventPayload,
    pub timestamp: Timestamp,
}

impl CollaborationEvent {
    pub fn new(
        project_id: ProjectId,
        origin: ConnectionId,
        payload: EventPayload,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            project_id,
            origin,
            payload,
            timestamp,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}

/// サーバーからクライアントへ送るメッセージ
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// 接続直後に 1 度だけ、本人にのみ送る
    Connected(ConnectionId),
    /// 参加直後に参加者本人にのみ送る Room のスナップショット
    RoomState(Room),
    Event(CollaborationEvent),
}
