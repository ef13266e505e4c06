//! メッセージ送信（通知）の実装
//!
//! ## 実装
//!
//! - `websocket`: WebSocket を使った実装
//! - 将来的に: `redis` pub/sub など（複数プロセス構成向け）

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
