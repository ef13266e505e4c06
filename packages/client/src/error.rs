//! Client-side error types.

use atelier_server::domain::ValueObjectError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Connection lost")]
    ConnectionLost,

    #[error("Not connected to the collaboration server")]
    NotConnected,

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ValueObjectError),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}
