//! Project collaboration room server library.
//!
//! Relays presence, cursor, tool, selection, view, chat and design-update
//! events between every client joined to the same project, and keeps the
//! live state of each project room in memory.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// composition root
pub mod app;
