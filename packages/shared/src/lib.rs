//! Utilities shared by the Atelier collaboration server and client.

pub mod logger;
pub mod time;
