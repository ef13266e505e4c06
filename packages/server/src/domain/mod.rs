//! Domain layer
//!
//! コラボレーションルームのドメインモデルと、外部依存（ストア・接続管理・通知）の
//! インターフェースを定義します。

pub mod entity;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use entity::{Member, Participant, Room, SharedViewState};
pub use error::{MessagePushError, RegistryError, RepositoryError, ValueObjectError};
pub use event::{
    ChatMessage, ClientEvent, CollaborationEvent, EventKind, EventPayload, FanOut,
    OutboundMessage,
};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use registry::ConnectionRegistry;
pub use repository::{RoomRepository, SharedRoom};
pub use value_object::{
    AvatarRef, ChatText, ConnectionId, CursorPosition, DisplayName, ElementId, ParticipantId,
    ProjectId, Role, Timestamp, ToolName, UpdateType, ViewMode, ZoomLevel,
};
