//! UseCase layer
//!
//! - `presence`: 参加・退出と Room のライフサイクル（Presence & Lifecycle Manager）
//! - `connection`: 接続の登録・切断（Connection Registry 側の操作）
//! - `route_event`: 参加後イベントの検証・適用・ファンアウト（Event Router）
//! - `get_rooms` / `get_room_detail`: HTTP API 向けの参照系

mod connection;
mod error;
mod get_room_detail;
mod get_rooms;
mod presence;
mod route_event;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection::ConnectionUseCase;
pub use error::{GetRoomDetailError, PresenceError, RouteError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use presence::{JoinOutcome, PresenceUseCase};
pub use route_event::RouteEventUseCase;
