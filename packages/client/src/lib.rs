//! Collaboration session client.
//!
//! [`CollaborationSession`] is the only entry point UI code uses: it owns the
//! WebSocket connection, sends join / leave / emit requests and keeps a local
//! mirror of the latest known room state.

mod command;
mod domain;
pub mod error;
mod formatter;
pub mod mirror;
mod runner;
pub mod session;
mod ui;

pub use error::ClientError;
pub use mirror::MirroredState;
pub use runner::{ClientConfig, run_client};
pub use session::{CollaborationSession, SessionEvent};
