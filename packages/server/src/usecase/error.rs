//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{MessagePushError, RegistryError};

/// 参加処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// イベントルーティングのエラー（いずれも送信者には通知しない）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Connection '{connection_id}' has not joined project '{project_id}'")]
    NotJoined {
        connection_id: String,
        project_id: String,
    },

    #[error("Room '{0}' no longer exists")]
    RoomGone(String),

    #[error("Failed to fan out event: {0}")]
    Push(#[from] MessagePushError),
}

/// Room 詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Invalid project id")]
    InvalidProjectId,

    #[error("Room not found")]
    RoomNotFound,
}
