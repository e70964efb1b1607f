//! Room-scoped WebSocket chat relay.
//!
//! Clients connect to `/ws/chat/{room_name}`; every `{"message": ...}` frame
//! sent by a member is fanned out to all current members of that room.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
