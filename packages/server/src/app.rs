//! Dependency wiring for the in-memory server.

use std::sync::Arc;

use atelier_shared::time::Clock;

use crate::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryConnectionRegistry, InMemoryRoomRepository},
    },
    ui::Server,
    usecase::{
        ConnectionUseCase, GetRoomDetailUseCase, GetRoomsUseCase, PresenceUseCase,
        RouteEventUseCase,
    },
};

/// Build a server backed by the in-memory Room Store and Connection Registry.
///
/// Initialize dependencies in order:
/// 1. Repository / Registry
/// 2. MessagePusher
/// 3. UseCases
/// 4. Server
pub fn build_server(clock: Arc<dyn Clock>) -> Server {
    // 1. Create Repository and Registry (in-memory)
    let repository = Arc::new(InMemoryRoomRepository::new());
    let registry = Arc::new(InMemoryConnectionRegistry::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create UseCases
    let presence_usecase = Arc::new(PresenceUseCase::new(
        repository.clone(),
        registry.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let connection_usecase = Arc::new(ConnectionUseCase::new(
        registry.clone(),
        message_pusher.clone(),
        presence_usecase.clone(),
    ));
    let route_event_usecase = Arc::new(RouteEventUseCase::new(
        repository.clone(),
        registry,
        message_pusher,
        clock,
    ));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(repository.clone()));
    let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(repository));

    // 4. Create the server
    Server::new(
        connection_usecase,
        presence_usecase,
        route_event_usecase,
        get_rooms_usecase,
        get_room_detail_usecase,
    )
}
