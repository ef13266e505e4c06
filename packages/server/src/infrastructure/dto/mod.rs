//! Data Transfer Objects (DTOs) for the collaboration room.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket message DTOs
//! - `http`: HTTP API response DTOs
//!
//! `conversion` validates DTOs into domain types and renders domain types back.

pub mod conversion;
pub mod http;
pub mod websocket;
