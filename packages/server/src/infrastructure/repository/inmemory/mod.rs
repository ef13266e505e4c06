//! インメモリ実装

mod connection;
mod room;

pub use connection::InMemoryConnectionRegistry;
pub use room::InMemoryRoomRepository;
