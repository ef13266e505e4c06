//! Server state shared by all handlers.

use std::sync::Arc;

use crate::usecase::{
    ConnectionUseCase, GetRoomDetailUseCase, GetRoomsUseCase, PresenceUseCase, RouteEventUseCase,
};

/// Shared application state
pub struct AppState {
    /// 接続の登録・切断
    pub connection_usecase: Arc<ConnectionUseCase>,
    /// 参加・退出
    pub presence_usecase: Arc<PresenceUseCase>,
    /// 参加後イベントのルーティング
    pub route_event_usecase: Arc<RouteEventUseCase>,
    /// Room 一覧取得
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// Room 詳細取得
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
}
